//! Forge Pipeline - Single Entry Point
//!
//! Validation and generation both go through here. Generated text is ALWAYS
//! healed before it leaves the pipeline. No bypass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::artifacts::{sanitize_component_name, ArtifactBundle, ArtifactKind, InferredInputs};
use crate::config::ForgeConfig;
use crate::generator::{ComponentGenerator, GeneratorError};
use crate::hashing::{compute_bundle_hash, compute_job_hash};
use crate::healing::{missing_required_props, HealError, HealOutcome, Healer, StyleStrategy};
use crate::node::DesignNode;
use crate::registry::{ComponentRegistry, ComponentRule};
use crate::validation::{ComponentName, ValidationReport, Validator};
use crate::visual::VisualDecision;
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GeneratorError),

    #[error("Healer setup failed: {0}")]
    Healer(#[from] HealError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub artifact_name: String,
    pub prompt: String,
    #[serde(default)]
    pub inputs: Option<InferredInputs>,
    #[serde(default)]
    pub node: Option<DesignNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedComponent {
    pub id: String,
    pub component_name: String,
    pub artifact_name: String,
    pub engine_version: String,
    pub registry_version: String,
    pub generator: String,
    pub created_at: DateTime<Utc>,
    pub bundle: ArtifactBundle,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StyleStrategy>,
    pub bundle_hash: String,
    pub job_hash: String,
}

impl GeneratedComponent {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The forge pipeline - one entry point for validation and generation
pub struct ForgePipeline {
    registry: Arc<ComponentRegistry>,
    validator: Validator,
    healer: Healer,
    namespace_prefix: String,
}

impl ForgePipeline {
    pub fn new(registry: Arc<ComponentRegistry>, config: &ForgeConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            registry,
            validator: Validator::new(config.profile).with_namespace_prefix(config.namespace_prefix.clone()),
            healer: Healer::new(config)?,
            namespace_prefix: config.namespace_prefix.clone(),
        })
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Score a design tree against the registry
    pub fn validate_tree(&self, tree: &DesignNode) -> ValidationReport {
        self.validator.validate(tree, &self.registry)
    }

    /// Heal raw generator text that was produced elsewhere
    pub fn heal(
        &self,
        raw: &str,
        artifact_name: &str,
        inputs: Option<&InferredInputs>,
        node: Option<&DesignNode>,
    ) -> HealOutcome {
        let mut outcome = self.healer.heal(raw, artifact_name, inputs, node);
        if let Some(rule) = self.rule_for(artifact_name) {
            if let Some(source) = outcome.bundle.content(ArtifactKind::Structural) {
                let missing = missing_required_props(source, rule);
                outcome
                    .errors
                    .extend(missing.into_iter().map(|p| format!("Required property '{}' not declared", p)));
            }
        }
        outcome
    }

    /// Generate, then heal. Only a generator failure is an error; healing
    /// problems travel in `errors` next to the bundle.
    pub fn generate_component(
        &self,
        request: &GenerateRequest,
        generator: &dyn ComponentGenerator,
    ) -> Result<GeneratedComponent, PipelineError> {
        tracing::info!(artifact = %request.artifact_name, generator = generator.name(), "generating component");
        let raw = generator.generate(&request.prompt)?;

        // MANDATORY: healing always runs on generator output.
        let outcome = self.heal(&raw, &request.artifact_name, request.inputs.as_ref(), request.node.as_ref());

        let job_hash = compute_job_hash(
            &request.artifact_name,
            self.registry.version(),
            request,
            ENGINE_VERSION,
        )?;
        let bundle_hash = compute_bundle_hash(&outcome.bundle)?;

        Ok(GeneratedComponent {
            id: Uuid::new_v4().to_string(),
            component_name: sanitize_component_name(&request.artifact_name),
            artifact_name: request.artifact_name.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            registry_version: self.registry.version().to_string(),
            generator: generator.name().to_string(),
            created_at: Utc::now(),
            bundle: outcome.bundle,
            errors: outcome.errors,
            visual: outcome.visual,
            strategy: outcome.strategy,
            bundle_hash,
            job_hash,
        })
    }

    fn rule_for(&self, artifact_name: &str) -> Option<&ComponentRule> {
        let name = ComponentName::parse(&crate::artifacts::kebab_case(artifact_name), &self.namespace_prefix);
        self.registry.get(&name.lookup)
    }
}

impl Default for ForgePipeline {
    fn default() -> Self {
        Self {
            registry: Arc::new(ComponentRegistry::default()),
            validator: Validator::default(),
            healer: Healer::default(),
            namespace_prefix: ForgeConfig::default().namespace_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StaticGenerator;

    struct FailingGenerator;

    impl ComponentGenerator for FailingGenerator {
        fn name(&self) -> &str { "failing" }
        fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
            Err(GeneratorError::Unavailable("timeout".to_string()))
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            artifact_name: "Badge".to_string(),
            prompt: "make a badge".to_string(),
            inputs: None,
            node: None,
        }
    }

    #[test]
    fn test_generator_failure_is_the_only_error() {
        let err = ForgePipeline::default().generate_component(&request(), &FailingGenerator).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_extraction_failure_is_reported_not_raised() {
        let generator = StaticGenerator::new("Sorry, I cannot help with that.");
        let component = ForgePipeline::default().generate_component(&request(), &generator).unwrap();
        assert!(!component.is_clean());
        assert!(component.errors[0].starts_with("Extraction failed"));
        assert_eq!(component.component_name, "Badge");
    }

    #[test]
    fn test_required_props_checked_against_registry() {
        let registry = ComponentRegistry::from_json(r#"{ "badge": { "props": { "tone": { "required": true } } } }"#).unwrap();
        let pipeline = ForgePipeline::new(Arc::new(registry), &ForgeConfig::default()).unwrap();
        let raw = "```ts\nimport { Component } from '@angular/core';\n@Component({})\nexport class BadgeComponent {}\n```\n```html\n<span class=\"badge\">new</span>\n```\n```css\n.badge { color: red; }\n```";
        let outcome = pipeline.heal(raw, "Badge", None, None);
        assert_eq!(outcome.errors, vec!["Required property 'tone' not declared".to_string()]);
    }
}
