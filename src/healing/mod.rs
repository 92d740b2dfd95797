//! Artifact Healing Pipeline
//!
//! Stage order is fixed. Each stage relies on what the previous ones left:
//! 1. extract      - locate the four artifacts in raw generator text (fatal on miss)
//! 2. syntax       - repair the value-less style reference
//! 3. sanitize     - remove the disallowed toolkit
//! 4. enforce      - append the visual override block
//! 5. selectors    - align the style's custom class with the canonical class
//! 6. content      - fill empty interactive elements with a binding
//! 7. structure    - declare inferred inputs on the component class
//! 8. docs         - regenerate the story file when missing or unusable
//! 9. finalize     - structural invariants, reported but never destructive

pub mod content;
pub mod docs;
pub mod enforce;
pub mod extract;
pub mod finalize;
pub mod sanitize;
pub mod selectors;
pub mod structure;
pub mod syntax;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifacts::{kebab_case, pascal_case, ArtifactBundle, ArtifactKind, InferredInput, InferredInputs};
use crate::config::ForgeConfig;
use crate::node::DesignNode;
use crate::visual::VisualDecision;

pub use enforce::StyleStrategy;
pub use finalize::missing_required_props;

#[derive(Debug, Error)]
pub enum HealError {
    #[error("Extraction failed: missing {}", format_kinds(.missing))]
    Extraction { missing: Vec<ArtifactKind> },

    #[error("Stage {stage} failed: {message}")]
    Stage { stage: &'static str, message: String },

    #[error("Invalid toolkit pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn format_kinds(kinds: &[ArtifactKind]) -> String {
    kinds
        .iter()
        .map(|k| format!("{:?}", k).to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-request values every stage reads
pub struct HealContext<'a> {
    pub artifact_name: &'a str,
    /// Canonical class and file stem
    pub kebab_name: String,
    pub class_name: String,
    pub inputs: &'a [InferredInput],
    pub node: Option<&'a DesignNode>,
}

impl<'a> HealContext<'a> {
    pub fn new(artifact_name: &'a str, inputs: &'a [InferredInput], node: Option<&'a DesignNode>) -> Self {
        Self {
            artifact_name,
            kebab_name: kebab_case(artifact_name),
            class_name: format!("{}Component", pascal_case(artifact_name)),
            inputs,
            node,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealOutcome {
    pub bundle: ArtifactBundle,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StyleStrategy>,
}

impl HealOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Healer {
    sanitizer: sanitize::Sanitizer,
    min_markup_length: usize,
}

impl Healer {
    pub fn new(config: &ForgeConfig) -> Result<Self, HealError> {
        Ok(Self {
            sanitizer: sanitize::Sanitizer::new(&config.toolkit)?,
            min_markup_length: config.min_markup_length,
        })
    }

    /// Run every stage over raw generator text.
    ///
    /// Never fails: extraction misses return the partial bundle, later
    /// problems are collected in `errors` next to whatever was produced.
    pub fn heal(
        &self,
        raw: &str,
        artifact_name: &str,
        inputs: Option<&InferredInputs>,
        node: Option<&DesignNode>,
    ) -> HealOutcome {
        let inputs = inputs.map(|i| i.inputs.as_slice()).unwrap_or(&[]);
        let ctx = HealContext::new(artifact_name, inputs, node);
        let mut errors = vec![];

        let mut bundle = ArtifactBundle::default();
        if let Err(e) = extract::extract_into(&mut bundle, raw, &ctx) {
            tracing::warn!(artifact = artifact_name, error = %e, "extraction aborted healing");
            errors.push(e.to_string());
            return HealOutcome { bundle, errors, visual: None, strategy: None };
        }

        record("syntax", syntax::repair(&mut bundle, &ctx), &mut errors);
        record("sanitize", self.sanitizer.apply(&mut bundle), &mut errors);

        let visual = crate::visual::decide(node, artifact_name);
        let strategy = StyleStrategy::classify(&ctx.kebab_name);
        record("enforce", enforce::apply(&mut bundle, &visual, strategy), &mut errors);

        record("selectors", selectors::normalize(&mut bundle, &ctx), &mut errors);
        record("content", content::heal(&mut bundle, &ctx), &mut errors);
        record("structure", structure::heal(&mut bundle, &ctx), &mut errors);
        record("docs", docs::heal(&mut bundle, &ctx), &mut errors);

        errors.extend(finalize::validate(&bundle, self.min_markup_length));

        tracing::info!(
            artifact = artifact_name,
            ?strategy,
            errors = errors.len(),
            "healing complete"
        );
        HealOutcome { bundle, errors, visual: Some(visual), strategy: Some(strategy) }
    }
}

impl Default for Healer {
    fn default() -> Self {
        Self {
            sanitizer: sanitize::Sanitizer::default(),
            min_markup_length: ForgeConfig::default().min_markup_length,
        }
    }
}

fn record(stage: &'static str, result: Result<(), HealError>, errors: &mut Vec<String>) {
    match result {
        Ok(()) => tracing::debug!(stage, "stage complete"),
        Err(e) => {
            tracing::warn!(stage, error = %e, "stage failed, continuing");
            errors.push(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"Here is your component.

```typescript
import { Component } from '@angular/core';
import { ButtonModule } from 'primeng/button';

@Component({
  selector: 'app-danger-button',
  standalone: true,
  imports: [ButtonModule],
  templateUrl: './danger-button.component.html',
  styleUrls:
})
export class DangerButtonComponent {
}
```

```html
<p-button label="Delete" (onClick)="remove()" severity="secondary"></p-button>
```

```scss
.button-root {
  display: inline-block;
}
```
"#;

    #[test]
    fn test_full_run_without_doc_block() {
        let inputs = InferredInputs {
            inputs: vec![InferredInput::new("label", "string", Some("Delete"))],
            warnings: vec![],
        };
        let outcome = Healer::default().heal(RAW, "DangerButton", Some(&inputs), None);
        assert!(outcome.is_clean(), "{:?}", outcome.errors);

        let structural = outcome.bundle.content(ArtifactKind::Structural).unwrap();
        assert!(structural.contains("styleUrls: ['./danger-button.component.scss'],"));
        assert!(!structural.contains("primeng"));
        assert!(structural.contains("@Input() label: string = 'Delete';"));
        assert!(structural.contains("import { Component, Input } from '@angular/core';"));

        let markup = outcome.bundle.content(ArtifactKind::Markup).unwrap();
        assert!(markup.contains(r#"<button type="button" class="btn btn--secondary" (click)="remove()">Delete</button>"#));

        let style = outcome.bundle.content(ArtifactKind::Style).unwrap();
        assert!(style.starts_with(".button-root"));
        assert!(style.contains("background-color: #DC2626 !important;"));

        assert!(outcome.bundle.content(ArtifactKind::Doc).unwrap().contains("Meta<DangerButtonComponent>"));
        assert_eq!(outcome.strategy, Some(StyleStrategy::InteractiveControl));
    }

    #[test]
    fn test_extraction_failure_keeps_partial_bundle() {
        let raw = "```html\n<div class=\"card\">Hello there</div>\n```\n";
        let outcome = Healer::default().heal(raw, "Card", None, None);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("structural"));
        assert!(outcome.bundle.markup.is_some());
        assert!(outcome.bundle.structural.is_none());
        assert!(outcome.visual.is_none());
    }
}
