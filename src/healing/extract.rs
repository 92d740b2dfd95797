//! Stage 1: locate artifacts in raw generator text
//!
//! Strategies, tried in order per artifact:
//! language-tagged fence, fence naming the file, filename-comment region,
//! untagged fence sniffed by content.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::{HealContext, HealError};
use crate::artifacts::{Artifact, ArtifactBundle, ArtifactKind};

static FILE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?://|<!--|/\*)\s*(?:(?i:file(?:name)?)\s*:\s*)?([\w./-]+\.(?:ts|html|scss|css|sass))\s*(?:-->|\*/)?\s*$",
    )
    .unwrap()
});

#[derive(Debug, Clone)]
pub struct FencedBlock {
    pub info: String,
    pub body: String,
}

impl FencedBlock {
    fn language(&self) -> String {
        self.info
            .split(|c: char| c.is_whitespace() || c == ':')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Split text into fenced blocks. An unterminated fence runs to end of input.
pub fn fenced_blocks(raw: &str) -> Vec<FencedBlock> {
    let mut blocks = vec![];
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw.lines() {
        let trimmed = line.trim_start();
        match current.take() {
            None => {
                if let Some(info) = trimmed.strip_prefix("```") {
                    current = Some((info.trim().to_string(), vec![]));
                }
            }
            Some((info, mut body)) => {
                if trimmed.starts_with("```") {
                    blocks.push(FencedBlock { info, body: body.join("\n") });
                } else {
                    body.push(line);
                    current = Some((info, body));
                }
            }
        }
    }
    if let Some((info, body)) = current {
        blocks.push(FencedBlock { info, body: body.join("\n") });
    }
    blocks
}

fn looks_like_story(body: &str) -> bool {
    body.contains("Meta<") || body.contains("StoryObj") || body.contains("@storybook")
}

fn tagged_as(kind: ArtifactKind, block: &FencedBlock) -> bool {
    let lang = block.language();
    match kind {
        ArtifactKind::Structural => {
            matches!(lang.as_str(), "typescript" | "ts") && !looks_like_story(&block.body)
        }
        ArtifactKind::Doc => matches!(lang.as_str(), "typescript" | "ts") && looks_like_story(&block.body),
        ArtifactKind::Markup => lang == "html",
        ArtifactKind::Style => matches!(lang.as_str(), "scss" | "css" | "sass"),
    }
}

fn names_file_of(kind: ArtifactKind, file: &str) -> bool {
    let file = file.to_lowercase();
    match kind {
        ArtifactKind::Structural => file.ends_with(".ts") && !file.ends_with(".stories.ts") && !file.ends_with(".spec.ts"),
        ArtifactKind::Doc => file.ends_with(".stories.ts"),
        ArtifactKind::Markup => file.ends_with(".html"),
        ArtifactKind::Style => file.ends_with(".scss") || file.ends_with(".css") || file.ends_with(".sass"),
    }
}

fn info_names(kind: ArtifactKind, block: &FencedBlock) -> bool {
    block
        .info
        .split(|c: char| c.is_whitespace() || c == ':' || c == '"' || c == '=')
        .any(|token| token.contains('.') && names_file_of(kind, token))
}

fn sniffed_as(kind: ArtifactKind, block: &FencedBlock) -> bool {
    if !block.info.is_empty() {
        return false;
    }
    let body = block.body.trim();
    match kind {
        ArtifactKind::Structural => body.contains("@Component"),
        ArtifactKind::Doc => looks_like_story(body),
        ArtifactKind::Markup => body.starts_with('<'),
        ArtifactKind::Style => {
            !body.contains("import ") && !body.starts_with('<') && body.contains('{') && body.contains(';')
        }
    }
}

/// Regions introduced by `// name.component.ts` style comments
fn comment_region(raw: &str, kind: ArtifactKind) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    let start = lines.iter().position(|line| {
        FILE_COMMENT_RE
            .captures(line)
            .map_or(false, |c| names_file_of(kind, &c[1]))
    })?;

    let body: Vec<&str> = lines[start + 1..]
        .iter()
        .take_while(|line| !FILE_COMMENT_RE.is_match(line) && !line.trim_start().starts_with("```"))
        .copied()
        .collect();
    let body = body.join("\n").trim().to_string();
    (!body.is_empty()).then_some(body)
}

fn locate(kind: ArtifactKind, raw: &str, blocks: &[FencedBlock], used: &mut HashSet<usize>) -> Option<String> {
    let strategies: [fn(ArtifactKind, &FencedBlock) -> bool; 2] = [tagged_as, info_names];
    for strategy in strategies {
        if let Some((i, block)) = blocks
            .iter()
            .enumerate()
            .find(|(i, b)| !used.contains(i) && strategy(kind, *b))
        {
            used.insert(i);
            return Some(block.body.clone());
        }
    }

    if let Some(body) = comment_region(raw, kind) {
        return Some(body);
    }

    let (i, block) = blocks
        .iter()
        .enumerate()
        .find(|(i, b)| !used.contains(i) && sniffed_as(kind, *b))?;
    used.insert(i);
    Some(block.body.clone())
}

/// Fill `bundle` with every artifact found. Errors when a required one is missing;
/// whatever was found stays in the bundle.
pub fn extract_into(bundle: &mut ArtifactBundle, raw: &str, ctx: &HealContext<'_>) -> Result<(), HealError> {
    let blocks = fenced_blocks(raw);
    let mut used = HashSet::new();
    let mut missing = vec![];

    // Doc first so story files never get taken as the structural artifact
    for kind in [ArtifactKind::Doc, ArtifactKind::Structural, ArtifactKind::Markup, ArtifactKind::Style] {
        match locate(kind, raw, &blocks, &mut used).filter(|body| !body.trim().is_empty()) {
            Some(body) => {
                tracing::debug!(?kind, bytes = body.len(), "artifact located");
                *bundle.slot(kind) = Some(Artifact::new(kind, ctx.artifact_name, body));
            }
            None if kind.is_required() => missing.push(kind),
            None => tracing::debug!(?kind, "optional artifact absent"),
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        missing.sort_by_key(|k| ArtifactKind::ALL.iter().position(|a| a == k));
        Err(HealError::Extraction { missing })
    }
}
