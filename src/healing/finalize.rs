//! Stage 9: final structural checks
//!
//! Problems are reported, never repaired or removed.

use crate::artifacts::{ArtifactBundle, ArtifactKind};
use crate::registry::ComponentRule;

pub const STRUCTURAL_MARKERS: [(&str, &str); 3] = [
    ("@Component(", "component decorator"),
    ("export class ", "exported class"),
    ("@angular/core", "core framework import"),
];

pub fn validate(bundle: &ArtifactBundle, min_markup_length: usize) -> Vec<String> {
    let mut errors = vec![];

    for kind in ArtifactKind::ALL {
        match bundle.content(kind) {
            None => errors.push(format!("Missing {:?} artifact", kind).to_lowercase()),
            Some(content) if content.trim().is_empty() => {
                errors.push(format!("Empty {:?} artifact", kind).to_lowercase())
            }
            Some(_) => {}
        }
    }

    if let Some(source) = bundle.content(ArtifactKind::Structural) {
        for (marker, what) in STRUCTURAL_MARKERS {
            if !source.contains(marker) {
                errors.push(format!("Structural artifact lacks {} ({})", what, marker.trim()));
            }
        }
    }

    if let Some(markup) = bundle.content(ArtifactKind::Markup) {
        let len = markup.trim().len();
        if len > 0 && len < min_markup_length {
            errors.push(format!(
                "Markup too short: {} characters, expected at least {}",
                len, min_markup_length
            ));
        }
    }

    if !errors.is_empty() {
        tracing::warn!(count = errors.len(), "final validation found problems");
    }
    errors
}

/// Registry props marked required that never appear as `name:` in the source.
/// A plain substring test, so formatting changes can fool it either way.
pub fn missing_required_props(source: &str, rule: &ComponentRule) -> Vec<String> {
    rule.required_props()
        .filter(|name| !source.contains(&format!("{}:", name)))
        .cloned()
        .collect()
}
