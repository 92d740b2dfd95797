//! Component Registry - Rules Are Contracts
//!
//! Loaded once, read-only afterwards. Share it behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::ENGINE_VERSION;

pub type ComponentKey = String;

/// Wildcard entry in composition lists
pub const WILDCARD: &str = "*";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid registry document {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Registry requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRule {
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub props: BTreeMap<String, PropSpec>,
    #[serde(default)]
    pub composition: Composition,
}

impl ComponentRule {
    /// Case-insensitive lookup of a declared property
    pub fn find_prop(&self, name: &str) -> Option<(&String, &PropSpec)> {
        let wanted = name.to_lowercase();
        self.props.iter().find(|(k, _)| k.to_lowercase() == wanted)
    }

    pub fn required_props(&self) -> impl Iterator<Item = &String> {
        self.props.iter().filter(|(_, p)| p.required).map(|(k, _)| k)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropSpec {
    #[serde(rename = "type", default = "default_prop_type")]
    pub prop_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

fn default_prop_type() -> String { "string".to_string() }

impl Default for PropSpec {
    fn default() -> Self {
        Self {
            prop_type: default_prop_type(),
            required: false,
            allowed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    #[serde(default)]
    pub can_contain: Vec<String>,
    #[serde(default)]
    pub cannot_contain: Vec<String>,
}

impl Composition {
    pub fn forbids(&self, lookup_name: &str) -> bool {
        self.cannot_contain.iter().any(|c| c == lookup_name || c == WILDCARD)
    }

    /// Non-empty, non-wildcard allow-list that does not list the child
    pub fn disallows(&self, lookup_name: &str) -> bool {
        !self.can_contain.is_empty()
            && !self.can_contain.iter().any(|c| c == lookup_name || c == WILDCARD)
    }
}

/// On-disk registry document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryDocument {
    Versioned {
        #[serde(default)]
        version: Option<String>,
        #[serde(rename = "engineMinVersion", default)]
        engine_min_version: Option<String>,
        components: BTreeMap<ComponentKey, ComponentRule>,
    },
    Bare(BTreeMap<ComponentKey, ComponentRule>),
}

/// Component registry - loads and caches rules
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    rules: BTreeMap<ComponentKey, ComponentRule>,
    version: Option<String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.merge_json(content, "<inline>")?;
        Ok(registry)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        let content = fs::read_to_string(path)?;
        registry.merge_json(&content, &path.display().to_string())?;
        Ok(registry)
    }

    /// Merge every `*.json` document in `dir`, in file-name order. Later files override.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        if dir.exists() {
            let mut paths: Vec<_> = fs::read_dir(dir)?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().map_or(false, |e| e == "json"))
                .collect();
            paths.sort();
            for path in paths {
                let content = fs::read_to_string(&path)?;
                registry.merge_json(&content, &path.display().to_string())?;
            }
        }
        Ok(registry)
    }

    fn merge_json(&mut self, content: &str, origin: &str) -> Result<(), RegistryError> {
        let doc: RegistryDocument = serde_json::from_str(content).map_err(|source| {
            RegistryError::Parse { path: origin.to_string(), source }
        })?;

        let components = match doc {
            RegistryDocument::Versioned { version, engine_min_version, components } => {
                if let Some(min) = engine_min_version {
                    check_engine_version(&min)?;
                }
                if version.is_some() {
                    self.version = version;
                }
                components
            }
            RegistryDocument::Bare(components) => components,
        };

        tracing::debug!(origin, count = components.len(), "registry document loaded");
        self.rules.extend(components);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ComponentRule> {
        self.rules.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn list(&self) -> Vec<(&ComponentKey, &ComponentRule)> {
        self.rules.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("unversioned")
    }

    pub fn register(&mut self, key: impl Into<ComponentKey>, rule: ComponentRule) {
        self.rules.insert(key.into(), rule);
    }
}

fn check_engine_version(required: &str) -> Result<(), RegistryError> {
    let engine = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| RegistryError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min = semver::Version::parse(required)
        .map_err(|_| RegistryError::InvalidVersion(required.to_string()))?;

    if engine < min {
        return Err(RegistryError::EngineVersionMismatch {
            required: required.to_string(),
            current: ENGINE_VERSION.to_string(),
        });
    }
    Ok(())
}
