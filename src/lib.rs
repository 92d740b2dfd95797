//! ForgeUI Core - Component Governance Compiler
//!
//! # The Five Laws (Non-Negotiable)
//! 1. The Registry Is Truth
//! 2. Validation Scores, It Never Rewrites
//! 3. Design Data Beats Guesswork
//! 4. Generated Text Is Always Healed
//! 5. Healing Reports What It Cannot Fix

pub mod artifacts;
pub mod config;
pub mod generator;
pub mod hashing;
pub mod healing;
pub mod node;
pub mod pipeline;
pub mod registry;
pub mod sink;
pub mod validation;
pub mod visual;

pub use artifacts::{Artifact, ArtifactBundle, ArtifactKind, InferredInput, InferredInputs};
pub use config::{ConfigError, ForgeConfig, ToolkitConfig};
pub use generator::{ComponentGenerator, GeneratorError, StaticGenerator};
pub use hashing::{canonical_json, compute_bundle_hash, compute_job_hash};
pub use healing::{HealError, HealOutcome, Healer, StyleStrategy};
pub use node::{DesignNode, FillEntry, PropertyDescriptor, Rgb};
pub use pipeline::{ForgePipeline, GenerateRequest, GeneratedComponent, PipelineError};
pub use registry::{ComponentRegistry, ComponentRule, Composition, PropSpec, RegistryError};
pub use sink::{ArtifactSink, DirectorySink};
pub use validation::{
    ValidationProfile, ValidationReport, ValidationRule, ValidationViolation, Validator, ViolationSeverity,
};
pub use visual::VisualDecision;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
