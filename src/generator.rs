//! Generative Model Seam
//!
//! The model is opaque: a prompt goes in, raw text comes out. Healing never
//! depends on a live call, so tests plug in fixed output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("Generator returned empty text")]
    Empty,
}

pub trait ComponentGenerator: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Returns the same text for every prompt
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    output: String,
}

impl StaticGenerator {
    pub fn new(output: impl Into<String>) -> Self {
        Self { output: output.into() }
    }
}

impl ComponentGenerator for StaticGenerator {
    fn name(&self) -> &str { "static" }

    fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        if self.output.trim().is_empty() {
            return Err(GeneratorError::Empty);
        }
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_output() {
        let generator = StaticGenerator::new("```html\n<b>x</b>\n```");
        assert_eq!(generator.generate("anything").unwrap(), "```html\n<b>x</b>\n```");
        assert!(matches!(StaticGenerator::new("  ").generate("p"), Err(GeneratorError::Empty)));
    }
}
