//! Artifact Bundle - The four files a generated component ships as

use serde::{Deserialize, Serialize};

/// Used when a name sanitizes to nothing
pub const DEFAULT_COMPONENT_NAME: &str = "GeneratedComponent";
/// Prefix for names that would start with a digit
pub const LEADING_DIGIT_PREFIX: &str = "Component";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Structural,
    Markup,
    Style,
    Doc,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [Self::Structural, Self::Markup, Self::Style, Self::Doc];

    pub fn language(&self) -> &'static str {
        match self {
            Self::Structural | Self::Doc => "typescript",
            Self::Markup => "html",
            Self::Style => "scss",
        }
    }

    /// File-name suffix after the kebab-case stem
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Structural => ".component.ts",
            Self::Markup => ".component.html",
            Self::Style => ".component.scss",
            Self::Doc => ".stories.ts",
        }
    }

    pub fn file_name(&self, artifact_name: &str) -> String {
        format!("{}{}", kebab_case(artifact_name), self.suffix())
    }

    /// Whether a missing artifact of this kind aborts healing
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Doc)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub file_name: String,
    pub content: String,
    pub language: String,
    pub size: usize,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, artifact_name: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            file_name: kind.file_name(artifact_name),
            size: content.len(),
            content,
            language: kind.language().to_string(),
        }
    }

    pub fn set_content(&mut self, content: String) {
        self.size = content.len();
        self.content = content;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Artifact>,
}

impl ArtifactBundle {
    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        match kind {
            ArtifactKind::Structural => self.structural.as_ref(),
            ArtifactKind::Markup => self.markup.as_ref(),
            ArtifactKind::Style => self.style.as_ref(),
            ArtifactKind::Doc => self.doc.as_ref(),
        }
    }

    pub fn slot(&mut self, kind: ArtifactKind) -> &mut Option<Artifact> {
        match kind {
            ArtifactKind::Structural => &mut self.structural,
            ArtifactKind::Markup => &mut self.markup,
            ArtifactKind::Style => &mut self.style,
            ArtifactKind::Doc => &mut self.doc,
        }
    }

    pub fn content(&self, kind: ArtifactKind) -> Option<&str> {
        self.get(kind).map(|a| a.content.as_str())
    }

    /// Rewrite an artifact's content in place. No-op when absent.
    pub fn update<F>(&mut self, kind: ArtifactKind, f: F)
    where
        F: FnOnce(&str) -> String,
    {
        if let Some(artifact) = self.slot(kind).as_mut() {
            let next = f(&artifact.content);
            if next != artifact.content {
                artifact.set_content(next);
            }
        }
    }

    pub fn present(&self) -> impl Iterator<Item = &Artifact> {
        ArtifactKind::ALL.into_iter().filter_map(move |k| self.get(k))
    }
}

/// Component input discovered by the upstream inference step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferredInput {
    pub name: String,
    #[serde(rename = "type", default = "default_input_type")]
    pub input_type: String,
    #[serde(default)]
    pub default_value: Option<String>,
}

fn default_input_type() -> String { "string".to_string() }

impl InferredInput {
    pub fn new(name: impl Into<String>, input_type: impl Into<String>, default_value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            default_value: default_value.map(str::to_string),
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.input_type.trim() == "boolean"
    }

    /// Options of a union-of-literals type like `'primary' | 'ghost'`
    pub fn literal_options(&self) -> Option<Vec<String>> {
        let parts: Vec<&str> = self.input_type.split('|').map(str::trim).collect();
        if parts.len() < 2 {
            return None;
        }
        parts.iter().map(|p| unquote(p).map(str::to_string)).collect()
    }

    pub fn is_string_like(&self) -> bool {
        self.input_type.trim() == "string" || self.literal_options().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferredInputs {
    #[serde(default)]
    pub inputs: Vec<InferredInput>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

pub fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    for q in ['\'', '"', '`'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

fn words(name: &str) -> Vec<String> {
    let mut words = vec![];
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `PrimaryButton` / `primary button` -> `primary-button`
pub fn kebab_case(name: &str) -> String {
    words(name).join("-")
}

/// `primary-button` -> `PrimaryButton`
pub fn pascal_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Directory-safe component name used by persistence
pub fn sanitize_component_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match stripped.chars().next() {
        None => DEFAULT_COMPONENT_NAME.to_string(),
        Some(c) if c.is_ascii_digit() => format!("{}{}", LEADING_DIGIT_PREFIX, stripped),
        Some(_) => stripped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(kebab_case("PrimaryButton"), "primary-button");
        assert_eq!(kebab_case("primary button"), "primary-button");
        assert_eq!(pascal_case("primary-button"), "PrimaryButton");
        assert_eq!(pascal_case("Card"), "Card");
    }

    #[test]
    fn test_sanitize_component_name() {
        assert_eq!(sanitize_component_name("Primary Button!"), "PrimaryButton");
        assert_eq!(sanitize_component_name("3d-card"), "Component3dcard");
        assert_eq!(sanitize_component_name("  ***  "), DEFAULT_COMPONENT_NAME);
    }

    #[test]
    fn test_literal_options() {
        let input = InferredInput::new("variant", "'primary' | \"ghost\"", None);
        assert_eq!(input.literal_options(), Some(vec!["primary".to_string(), "ghost".to_string()]));
        assert!(InferredInput::new("size", "string | number", None).literal_options().is_none());
    }

    #[test]
    fn test_update_tracks_size() {
        let mut bundle = ArtifactBundle {
            markup: Some(Artifact::new(ArtifactKind::Markup, "Chip", "<span></span>")),
            ..Default::default()
        };
        bundle.update(ArtifactKind::Markup, |c| format!("{}\n", c));
        let markup = bundle.markup.unwrap();
        assert_eq!(markup.size, 14);
        assert_eq!(markup.file_name, "chip.component.html");
    }
}
