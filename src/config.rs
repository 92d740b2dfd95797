//! Engine configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::validation::ValidationProfile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeConfig {
    /// Layer-name prefix that marks a node as a governed component
    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,
    #[serde(default)]
    pub profile: ValidationProfile,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
    #[serde(default = "default_min_markup_length")]
    pub min_markup_length: usize,
}

fn default_namespace_prefix() -> String { "app-".to_string() }
fn default_min_markup_length() -> usize { 10 }

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: default_namespace_prefix(),
            profile: ValidationProfile::default(),
            toolkit: ToolkitConfig::default(),
            min_markup_length: default_min_markup_length(),
        }
    }
}

impl ForgeConfig {
    /// Missing file means defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// The external UI toolkit generated code must not depend on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolkitConfig {
    #[serde(default = "default_element_prefix")]
    pub element_prefix: String,
    #[serde(default = "default_module_prefix")]
    pub module_prefix: String,
}

fn default_element_prefix() -> String { "p-".to_string() }
fn default_module_prefix() -> String { "primeng".to_string() }

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            element_prefix: default_element_prefix(),
            module_prefix: default_module_prefix(),
        }
    }
}
