//! Stage 2: value-less style reference repair
//!
//! `styleUrls:` / `styleUrl: ,` with nothing after it becomes the
//! single-file array form pointing at the bundle's style artifact.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{HealContext, HealError};
use crate::artifacts::{ArtifactBundle, ArtifactKind};

static EMPTY_STYLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)styleUrls?[ \t]*:[ \t]*,?[ \t]*(\}\)?;?)?[ \t]*$").unwrap()
});

pub fn repair(bundle: &mut ArtifactBundle, ctx: &HealContext<'_>) -> Result<(), HealError> {
    let style_file = ArtifactKind::Style.file_name(ctx.artifact_name);
    bundle.update(ArtifactKind::Structural, |content| repair_style_reference(content, &style_file));
    Ok(())
}

pub fn repair_style_reference(content: &str, style_file: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in EMPTY_STYLE_REF_RE.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if caps.get(2).is_none() && value_follows(&content[whole.end()..]) {
            continue;
        }
        out.push_str(&content[last..whole.start()]);
        out.push_str(&replacement(&caps, style_file));
        last = whole.end();
    }
    out.push_str(&content[last..]);
    out
}

fn replacement(caps: &Captures, style_file: &str) -> String {
    let mut fixed = format!("{}styleUrls: ['./{}'],", &caps[1], style_file);
    if let Some(closing) = caps.get(2) {
        fixed.push('\n');
        fixed.push_str(closing.as_str());
    }
    tracing::debug!(style_file, "repaired empty style reference");
    fixed
}

/// Whether the next non-blank line carries the value of a key split across lines
fn value_follows(rest: &str) -> bool {
    rest.lines()
        .map(str::trim_start)
        .find(|line| !line.is_empty())
        .map_or(false, |line| line.starts_with(['[', '\'', '"', '`']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_key_on_own_line() {
        let src = "@Component({\n  selector: 'app-chip',\n  styleUrls:\n})";
        let fixed = repair_style_reference(src, "chip.component.scss");
        assert_eq!(fixed, "@Component({\n  selector: 'app-chip',\n  styleUrls: ['./chip.component.scss'],\n})");
    }

    #[test]
    fn test_singular_key_with_comma_and_closing() {
        let src = "@Component({\n  styleUrl: , })";
        let fixed = repair_style_reference(src, "chip.component.scss");
        assert_eq!(fixed, "@Component({\n  styleUrls: ['./chip.component.scss'],\n})");
    }

    #[test]
    fn test_value_on_next_line_untouched() {
        let src = "@Component({\n  styleUrls:\n    ['./x.component.scss'],\n})";
        assert_eq!(repair_style_reference(src, "chip.component.scss"), src);

        let src = "@Component({\n  styleUrl:\n\n    './x.component.scss',\n})";
        assert_eq!(repair_style_reference(src, "chip.component.scss"), src);
    }

    #[test]
    fn test_valid_reference_untouched() {
        let src = "  styleUrls: ['./other.scss'],\n  styleUrl: './x.scss'";
        assert_eq!(repair_style_reference(src, "chip.component.scss"), src);
    }
}
