//! Stage 6: content healing
//!
//! An empty `<button>` or `<a>` gets a text binding so the control is never blank.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{HealContext, HealError};
use crate::artifacts::{ArtifactBundle, ArtifactKind, InferredInput};

pub const DEFAULT_TEXT_BINDING: &str = "label";

static TEXT_INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)label|text|caption|title|content").unwrap());

static EMPTY_INTERACTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(button|a)\b([^>]*)>\s*</(button|a)\s*>").unwrap());

/// First inferred input that reads like display text
pub fn text_binding(inputs: &[InferredInput]) -> &str {
    inputs
        .iter()
        .find(|i| TEXT_INPUT_RE.is_match(&i.name))
        .map(|i| i.name.as_str())
        .unwrap_or(DEFAULT_TEXT_BINDING)
}

pub fn fill_empty_controls(markup: &str, binding: &str) -> String {
    EMPTY_INTERACTIVE_RE
        .replace_all(markup, |caps: &Captures| {
            if caps[1] != caps[3] {
                return caps[0].to_string();
            }
            format!("<{tag}{attrs}>{{{{ {binding} }}}}</{tag}>", tag = &caps[1], attrs = &caps[2])
        })
        .into_owned()
}

pub fn heal(bundle: &mut ArtifactBundle, ctx: &HealContext<'_>) -> Result<(), HealError> {
    let binding = text_binding(ctx.inputs);
    bundle.update(ArtifactKind::Markup, |markup| fill_empty_controls(markup, binding));
    Ok(())
}
