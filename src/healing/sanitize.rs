//! Stage 3: disallowed toolkit removal
//!
//! Structural: drop the toolkit's imports and their entries in `imports: [...]`.
//! Markup: toolkit buttons become native buttons, other toolkit tags lose the prefix.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::HealError;
use crate::artifacts::{ArtifactBundle, ArtifactKind};
use crate::config::ToolkitConfig;

/// Variant words that survive as `btn--<variant>`
pub const VARIANT_KEYWORDS: [&str; 5] = ["secondary", "ghost", "outline", "danger", "text"];

static IMPORTS_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"imports(\s*):(\s*)\[([^\]]*)\]").unwrap());

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\[(]{0,2}[\w.:-]+[\])]{0,2})(?:\s*=\s*"([^"]*)")?"#).unwrap()
});

pub struct Sanitizer {
    module_prefix: String,
    import_re: Regex,
    button_re: Regex,
    prefixed_tag_re: Regex,
}

impl Sanitizer {
    pub fn new(toolkit: &ToolkitConfig) -> Result<Self, HealError> {
        let module = regex::escape(&toolkit.module_prefix);
        let element = regex::escape(&toolkit.element_prefix);
        Ok(Self {
            module_prefix: toolkit.module_prefix.clone(),
            import_re: Regex::new(&format!(
                r#"(?m)^[ \t]*import\s+(?:([^;'"]*?)\s+from\s+)?['"]{module}[^'"]*['"][ \t]*;?[ \t]*\n?"#
            ))?,
            button_re: Regex::new(&format!(
                r"(?s)<{element}button\b([^>]*?)(?:/>|>(.*?)</{element}button\s*>)"
            ))?,
            prefixed_tag_re: Regex::new(&format!(r"(</?){element}([A-Za-z])"))?,
        })
    }

    pub fn apply(&self, bundle: &mut ArtifactBundle) -> Result<(), HealError> {
        bundle.update(ArtifactKind::Structural, |c| self.sanitize_structural(c));
        bundle.update(ArtifactKind::Markup, |c| self.sanitize_markup(c));
        Ok(())
    }

    pub fn sanitize_structural(&self, content: &str) -> String {
        if !content.contains(&self.module_prefix) {
            return content.to_string();
        }

        let removed: HashSet<String> = self
            .import_re
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .flat_map(|m| imported_names(m.as_str()))
            .collect();
        tracing::debug!(?removed, "stripping toolkit imports");

        let without_imports = self.import_re.replace_all(content, "");
        IMPORTS_ARRAY_RE
            .replace_all(&without_imports, |caps: &Captures| {
                let kept: Vec<&str> = caps[3]
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty() && !removed.contains(*item))
                    .collect();
                format!("imports{}:{}[{}]", &caps[1], &caps[2], kept.join(", "))
            })
            .into_owned()
    }

    pub fn sanitize_markup(&self, content: &str) -> String {
        let natives = self
            .button_re
            .replace_all(content, |caps: &Captures| {
                native_button(&caps[1], caps.get(2).map_or("", |m| m.as_str()))
            });
        self.prefixed_tag_re.replace_all(&natives, "${1}${2}").into_owned()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        // Escaped default prefixes always compile
        Self::new(&ToolkitConfig::default()).expect("default toolkit patterns are valid")
    }
}

/// `{ A, B as C }` -> [A, C]; `* as X` -> [X]; `Default` -> [Default]
fn imported_names(clause: &str) -> Vec<String> {
    clause
        .split(|c| c == ',' || c == '{' || c == '}')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.rsplit(" as ").next().unwrap_or(s).trim().to_string())
        .collect()
}

fn native_button(attrs: &str, inner: &str) -> String {
    let mut label = None;
    let mut click = None;
    let mut disabled = None;
    let mut variant = None;

    for caps in ATTR_RE.captures_iter(attrs) {
        let name = &caps[1];
        let value = caps.get(2).map(|m| m.as_str());
        match (name, value) {
            ("label", Some(v)) => label = Some(v.to_string()),
            ("[label]", Some(v)) => label = Some(format!("{{{{ {} }}}}", v.trim())),
            ("(onClick)" | "(click)", Some(v)) => click = Some(v.to_string()),
            ("[disabled]", Some(v)) => disabled = Some(format!(r#" [disabled]="{}""#, v)),
            ("disabled", _) => disabled = Some(" disabled".to_string()),
            ("outlined" | "[outlined]", _) => variant = variant.or(Some("outline")),
            ("text" | "[text]", _) => variant = variant.or(Some("text")),
            ("severity" | "variant" | "styleClass" | "class", Some(v)) => {
                let v = v.to_lowercase();
                if let Some(k) = VARIANT_KEYWORDS.iter().find(|k| v.contains(*k)) {
                    variant = Some(*k);
                }
            }
            _ => {}
        }
    }

    let text = label.unwrap_or_else(|| inner.trim().to_string());
    let class = match variant {
        Some(v) => format!("btn btn--{}", v),
        None => "btn".to_string(),
    };
    let click = click.map(|c| format!(r#" (click)="{}""#, c)).unwrap_or_default();

    format!(
        r#"<button type="button" class="{}"{}{}>{}</button>"#,
        class,
        click,
        disabled.unwrap_or_default(),
        text
    )
}
