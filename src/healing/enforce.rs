//! Stage 4: visual enforcement
//!
//! Appends a namespaced `!important` block so the design's color, radius and
//! spacing win over whatever the generator wrote. Prior style content is kept.

use serde::{Deserialize, Serialize};

use super::HealError;
use crate::artifacts::{ArtifactBundle, ArtifactKind};
use crate::visual::VisualDecision;

pub const ENFORCE_START: &str = "/* forgeui:enforce:start */";
pub const ENFORCE_END: &str = "/* forgeui:enforce:end */";

const FIELD_BACKGROUND: &str = "#FFFFFF";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StyleStrategy {
    InteractiveControl,
    Container,
    Icon,
    Field,
    Generic,
}

impl StyleStrategy {
    /// Whole-word keyword match on a kebab-case name, first hit wins
    pub fn classify(name: &str) -> Self {
        let segments: Vec<String> = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        let has = |words: &[&str]| segments.iter().any(|s| words.iter().any(|w| s == w));
        if has(&["button", "btn", "toggle", "chip", "tab", "link", "switch"]) {
            Self::InteractiveControl
        } else if has(&["card", "panel", "modal", "dialog", "container"]) {
            Self::Container
        } else if has(&["icon", "svg"]) {
            Self::Icon
        } else if has(&["input", "text", "field", "textarea", "select"]) {
            Self::Field
        } else {
            Self::Generic
        }
    }

    fn host_display(&self) -> &'static str {
        match self {
            Self::InteractiveControl | Self::Icon => "inline-block",
            Self::Container | Self::Field | Self::Generic => "block",
        }
    }

    fn native_selectors(&self) -> &'static [&'static str] {
        match self {
            Self::InteractiveControl => &[":host button", ":host a", ":host [role=\"button\"]"],
            Self::Container => &[":host > div", ":host > section", ":host > article"],
            Self::Icon => &[":host svg", ":host i"],
            Self::Field => &[":host input", ":host textarea", ":host select"],
            Self::Generic => &[":host > *"],
        }
    }

    fn declarations(&self, v: &VisualDecision) -> Vec<(&'static str, String)> {
        match self {
            Self::InteractiveControl => {
                let mut decls = vec![
                    ("background-color", v.hex_color.clone()),
                    ("color", v.contrast_color.clone()),
                    ("padding", v.padding.clone()),
                    ("border-radius", v.border_radius.clone()),
                    ("font-size", v.font_size.clone()),
                ];
                if let Some(weight) = &v.font_weight {
                    decls.push(("font-weight", weight.clone()));
                }
                decls.push(("display", "inline-flex".to_string()));
                decls.push(("align-items", "center".to_string()));
                decls
            }
            Self::Container => vec![
                ("background-color", v.hex_color.clone()),
                ("border-radius", v.border_radius.clone()),
                ("padding", v.padding.clone()),
                ("display", "block".to_string()),
                ("box-shadow", "0 2px 8px rgba(0, 0, 0, 0.15)".to_string()),
            ],
            Self::Icon => vec![
                ("fill", v.hex_color.clone()),
                ("color", v.hex_color.clone()),
            ],
            Self::Field => vec![
                ("border", format!("1px solid {}", v.hex_color)),
                ("border-radius", v.border_radius.clone()),
                ("padding", v.padding.clone()),
                ("background-color", FIELD_BACKGROUND.to_string()),
            ],
            Self::Generic => vec![
                ("background-color", v.hex_color.clone()),
                ("border-radius", v.border_radius.clone()),
            ],
        }
    }

    pub fn override_block(&self, visual: &VisualDecision) -> String {
        let body: String = self
            .declarations(visual)
            .into_iter()
            .map(|(prop, value)| format!("  {}: {} !important;\n", prop, value))
            .collect();

        format!(
            "{start}\n:host {{\n  display: {display} !important;\n}}\n{selectors} {{\n{body}}}\n{end}\n",
            start = ENFORCE_START,
            display = self.host_display(),
            selectors = self.native_selectors().join(",\n"),
            body = body,
            end = ENFORCE_END,
        )
    }
}

pub fn apply(bundle: &mut ArtifactBundle, visual: &VisualDecision, strategy: StyleStrategy) -> Result<(), HealError> {
    bundle.update(ArtifactKind::Style, |content| {
        if content.contains(ENFORCE_START) {
            return content.to_string();
        }
        let mut next = content.trim_end().to_string();
        if !next.is_empty() {
            next.push_str("\n\n");
        }
        next.push_str(&strategy.override_block(visual));
        next
    });
    tracing::debug!(?strategy, color = %visual.hex_color, "visual enforcement applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Artifact;
    use crate::visual;

    fn style_bundle(content: &str) -> ArtifactBundle {
        ArtifactBundle {
            style: Some(Artifact::new(ArtifactKind::Style, "x", content)),
            ..Default::default()
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(StyleStrategy::classify("primary-button"), StyleStrategy::InteractiveControl);
        assert_eq!(StyleStrategy::classify("profile-card"), StyleStrategy::Container);
        assert_eq!(StyleStrategy::classify("close-icon"), StyleStrategy::Icon);
        assert_eq!(StyleStrategy::classify("search-input"), StyleStrategy::Field);
        assert_eq!(StyleStrategy::classify("avatar"), StyleStrategy::Generic);
    }

    #[test]
    fn test_classification_matches_whole_segments() {
        assert_eq!(StyleStrategy::classify("data-table"), StyleStrategy::Generic);
        assert_eq!(StyleStrategy::classify("context-menu"), StyleStrategy::Generic);
        assert_eq!(StyleStrategy::classify("tab"), StyleStrategy::InteractiveControl);
        assert_eq!(StyleStrategy::classify("Rich-Text-Field"), StyleStrategy::Field);
    }

    #[test]
    fn test_interactive_block_is_appended() {
        let decision = visual::decide(None, "danger");
        let mut bundle = style_bundle(".x { color: blue; }\n");
        apply(&mut bundle, &decision, StyleStrategy::InteractiveControl).unwrap();

        let css = bundle.content(ArtifactKind::Style).unwrap();
        assert!(css.starts_with(".x { color: blue; }\n\n/* forgeui:enforce:start */"));
        assert!(css.contains(":host button,\n:host a"));
        assert!(css.contains("background-color: #DC2626 !important;"));
        assert!(css.contains("color: #FFFFFF !important;"));
        assert!(css.trim_end().ends_with(ENFORCE_END));
    }

    #[test]
    fn test_container_has_no_text_color() {
        let block = StyleStrategy::Container.override_block(&visual::decide(None, ""));
        assert!(block.contains("box-shadow"));
        assert!(!block.contains("  color:"));
    }

    #[test]
    fn test_field_uses_border_and_light_background() {
        let block = StyleStrategy::Field.override_block(&visual::decide(None, "info"));
        assert!(block.contains("border: 1px solid #2563EB !important;"));
        assert!(block.contains("background-color: #FFFFFF !important;"));
    }

    #[test]
    fn test_block_not_duplicated() {
        let decision = visual::decide(None, "");
        let mut bundle = style_bundle("");
        apply(&mut bundle, &decision, StyleStrategy::Generic).unwrap();
        let once = bundle.content(ArtifactKind::Style).unwrap().to_string();
        apply(&mut bundle, &decision, StyleStrategy::Generic).unwrap();
        assert_eq!(bundle.content(ArtifactKind::Style).unwrap(), once);
    }
}
