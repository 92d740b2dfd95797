//! Stage 5: selector normalization

use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::{HealContext, HealError};
use crate::artifacts::{ArtifactBundle, ArtifactKind};

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\bclass\s*=\s*"([^"]*)""#).unwrap());
static CLASS_SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.(-?[A-Za-z_][\w-]*)").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

pub fn markup_classes(markup: &str) -> BTreeSet<String> {
    CLASS_ATTR_RE
        .captures_iter(markup)
        .flat_map(|c| c[1].split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

/// Classes named in selectors at brace depth zero
pub fn top_level_classes(style: &str) -> BTreeSet<String> {
    let style = COMMENT_RE.replace_all(style, "");
    let mut classes = BTreeSet::new();
    let mut depth = 0usize;
    let mut selector = String::new();

    for ch in style.chars() {
        match ch {
            '{' => {
                if depth == 0 {
                    classes.extend(CLASS_SELECTOR_RE.captures_iter(&selector).map(|c| c[1].to_string()));
                }
                selector.clear();
                depth += 1;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                selector.clear();
            }
            ';' => selector.clear(),
            _ => selector.push(ch),
        }
    }
    classes
}

/// `.from` -> `.to` everywhere, leaving longer names like `.from-icon` alone
pub fn rename_class(style: &str, from: &str, to: &str) -> String {
    let re = match Regex::new(&format!(r"\.{}([^\w-]|$)", regex::escape(from))) {
        Ok(re) => re,
        Err(_) => return style.to_string(),
    };
    re.replace_all(style, |caps: &Captures| format!(".{}{}", to, &caps[1]))
        .into_owned()
}

pub fn normalize(bundle: &mut ArtifactBundle, ctx: &HealContext<'_>) -> Result<(), HealError> {
    let canonical = ctx.kebab_name.as_str();
    let (Some(markup), Some(style)) = (bundle.content(ArtifactKind::Markup), bundle.content(ArtifactKind::Style)) else {
        return Ok(());
    };

    if !markup_classes(markup).contains(canonical) {
        return Ok(());
    }
    let defined = top_level_classes(style);
    if defined.contains(canonical) {
        return Ok(());
    }
    let others: Vec<&String> = defined.iter().filter(|c| c.as_str() != canonical).collect();
    let [only] = others.as_slice() else {
        tracing::debug!(candidates = others.len(), "no unambiguous class to rename");
        return Ok(());
    };

    let only = only.to_string();
    tracing::debug!(from = %only, to = canonical, "renaming style class");
    bundle.update(ArtifactKind::Style, |content| rename_class(content, &only, canonical));
    Ok(())
}
