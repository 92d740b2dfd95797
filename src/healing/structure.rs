//! Stage 7: structural healing
//!
//! Declares every inferred input on the component class and makes sure the
//! decorator is imported. Declarations are only added when their marker is absent.

use regex::Regex;
use std::sync::LazyLock;

use super::{HealContext, HealError};
use crate::artifacts::{unquote, ArtifactBundle, ArtifactKind, InferredInput};

pub const CORE_MODULE: &str = "@angular/core";
pub const INPUT_DECORATOR: &str = "Input";

static NAMED_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^import\s*\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]\s*;?"#).unwrap()
});
static ANY_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^import\b[^;]*?['"][^'"]+['"]\s*;?"#).unwrap());
static CLASS_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+class\s+\w+[^{]*\{").unwrap());

/// `import { A, B } from 'module';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub names: Vec<String>,
    pub module: String,
}

impl NamedImport {
    pub fn render(&self) -> String {
        format!("import {{ {} }} from '{}';", self.names.join(", "), self.module)
    }
}

pub fn named_imports(source: &str) -> Vec<NamedImport> {
    NAMED_IMPORT_RE
        .captures_iter(source)
        .map(|c| NamedImport {
            names: c[1].split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::to_string).collect(),
            module: c[2].to_string(),
        })
        .collect()
}

/// Add `name` to the import of `module`, creating the import after the last existing one if needed
pub fn ensure_named_import(source: &str, name: &str, module: &str) -> String {
    if let Some(caps) = NAMED_IMPORT_RE.captures_iter(source).find(|c| &c[2] == module) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let mut decl = NamedImport {
            names: caps[1].split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::to_string).collect(),
            module: module.to_string(),
        };
        if decl.names.iter().any(|n| n == name) {
            return source.to_string();
        }
        decl.names.push(name.to_string());
        return format!("{}{}{}", &source[..whole.start], decl.render(), &source[whole.end..]);
    }

    let decl = NamedImport { names: vec![name.to_string()], module: module.to_string() };
    match ANY_IMPORT_RE.find_iter(source).last() {
        Some(last) => format!("{}\n{}{}", &source[..last.end()], decl.render(), &source[last.end()..]),
        None => format!("{}\n{}", decl.render(), source),
    }
}

/// Decorator input (any arguments, optional modifiers) or signal input
pub fn has_declaration(source: &str, input: &str) -> bool {
    let name = regex::escape(input);
    let pattern = format!(
        r"@Input\([^)]*\)\s*(?:(?:public|protected|readonly|override)\s+)*{name}\b|\b{name}\s*=\s*input(?:\.required)?\s*[<(]",
        name = name
    );
    Regex::new(&pattern).map(|re| re.is_match(source)).unwrap_or(false)
}

pub fn declaration(input: &InferredInput) -> String {
    let ty = input.input_type.trim();
    match &input.default_value {
        Some(default) => format!("@Input() {}: {} = {};", input.name, ty, ts_default(input, default)),
        None if input.is_boolean() => format!("@Input() {}: {} = false;", input.name, ty),
        None => format!("@Input() {}?: {};", input.name, ty),
    }
}

/// String-like defaults are quoted unless they already are
pub fn ts_default(input: &InferredInput, raw: &str) -> String {
    let raw = raw.trim();
    if input.is_string_like() && unquote(raw).is_none() {
        format!("'{}'", raw.replace('\'', "\\'"))
    } else {
        raw.to_string()
    }
}

pub fn heal(bundle: &mut ArtifactBundle, ctx: &HealContext<'_>) -> Result<(), HealError> {
    if ctx.inputs.is_empty() {
        return Ok(());
    }
    let Some(source) = bundle.content(ArtifactKind::Structural) else {
        return Ok(());
    };

    let mut source = source.to_string();
    let mut injected: Vec<String> = vec![];
    let mut declarations = String::new();
    for input in ctx.inputs {
        if has_declaration(&source, &input.name) || injected.contains(&input.name) {
            continue;
        }
        declarations.push_str(&format!("\n  {}", declaration(input)));
        injected.push(input.name.clone());
    }

    if !declarations.is_empty() {
        let open = CLASS_OPEN_RE.find(&source).ok_or_else(|| HealError::Stage {
            stage: "structure",
            message: "no exported class body to declare inputs in".to_string(),
        })?;
        source.insert_str(open.end(), &declarations);
    }

    if !injected.is_empty() || source.contains("@Input()") {
        source = ensure_named_import(&source, INPUT_DECORATOR, CORE_MODULE);
    }
    tracing::debug!(?injected, "structural inputs declared");
    bundle.update(ArtifactKind::Structural, |_| source);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Artifact;

    const SOURCE: &str = "import { Component } from '@angular/core';\n\n@Component({ selector: 'app-chip' })\nexport class ChipComponent {\n}\n";

    fn run(source: &str, inputs: &[InferredInput]) -> (String, Result<(), HealError>) {
        let ctx = HealContext::new("Chip", inputs, None);
        let mut bundle = ArtifactBundle {
            structural: Some(Artifact::new(ArtifactKind::Structural, "Chip", source)),
            ..Default::default()
        };
        let result = heal(&mut bundle, &ctx);
        (bundle.content(ArtifactKind::Structural).unwrap().to_string(), result)
    }

    #[test]
    fn test_inputs_declared_and_import_extended() {
        let inputs = [
            InferredInput::new("label", "string", Some("Tag")),
            InferredInput::new("removable", "boolean", None),
            InferredInput::new("size", "'sm' | 'md'", Some("'md'")),
        ];
        let (out, result) = run(SOURCE, &inputs);
        assert!(result.is_ok());
        assert!(out.starts_with("import { Component, Input } from '@angular/core';"));
        assert!(out.contains("@Input() label: string = 'Tag';"));
        assert!(out.contains("@Input() removable: boolean = false;"));
        assert!(out.contains("@Input() size: 'sm' | 'md' = 'md';"));
    }

    #[test]
    fn test_idempotent_and_deduplicated() {
        let inputs = [
            InferredInput::new("size", "string", None),
            InferredInput::new("size", "number", None),
        ];
        let (once, _) = run(SOURCE, &inputs);
        assert_eq!(once.matches("@Input() size").count(), 1);
        let (twice, _) = run(&once, &inputs);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_decorated_inputs_recognised() {
        let src = "import { Component, Input, input } from '@angular/core';\nexport class ChipComponent {\n  @Input({ required: true }) label!: string;\n  @Input() public tone = 'info';\n  size = input<'sm' | 'md'>('sm');\n}\n";
        let inputs = [
            InferredInput::new("label", "string", None),
            InferredInput::new("tone", "string", None),
            InferredInput::new("size", "string", None),
        ];
        let (out, result) = run(src, &inputs);
        assert!(result.is_ok());
        assert_eq!(out, src);
        assert_eq!(out.matches(" label").count(), 1);
    }

    #[test]
    fn test_declarations_keep_input_order() {
        let inputs = [InferredInput::new("a", "string", None), InferredInput::new("b", "string", None)];
        let (out, _) = run(SOURCE, &inputs);
        let a = out.find("@Input() a?: string;").unwrap();
        let b = out.find("@Input() b?: string;").unwrap();
        assert!(a < b, "{}", out);
    }

    #[test]
    fn test_import_added_when_module_missing() {
        let src = "import { NgIf } from '@angular/common';\nexport class ChipComponent {}";
        let out = ensure_named_import(src, "Input", CORE_MODULE);
        assert_eq!(out, "import { NgIf } from '@angular/common';\nimport { Input } from '@angular/core';\nexport class ChipComponent {}");
        assert_eq!(named_imports(&out).len(), 2);
    }

    #[test]
    fn test_missing_class_is_stage_error() {
        let (_, result) = run("const x = 1;", &[InferredInput::new("label", "string", None)]);
        assert!(matches!(result, Err(HealError::Stage { stage: "structure", .. })));
    }
}
