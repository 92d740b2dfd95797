//! Stage 8: documentation healing
//!
//! Rebuilds the story file from the inferred inputs when the generator left it
//! out or produced something without a story meta declaration.

use std::collections::HashSet;
use std::fmt::Write as _;

use super::structure::ts_default;
use super::{HealContext, HealError};
use crate::artifacts::{Artifact, ArtifactBundle, ArtifactKind, InferredInput};

pub const DOC_MARKER: &str = "Meta<";

/// Storybook control for one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Boolean,
    Select(Vec<String>),
    Text,
}

impl Control {
    pub fn for_input(input: &InferredInput) -> Self {
        if input.is_boolean() {
            Self::Boolean
        } else if let Some(options) = input.literal_options() {
            Self::Select(options)
        } else {
            Self::Text
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Boolean => "{ control: 'boolean' }".to_string(),
            Self::Text => "{ control: 'text' }".to_string(),
            Self::Select(options) => {
                let options: Vec<String> = options.iter().map(|o| format!("'{}'", o)).collect();
                format!("{{ control: 'select', options: [{}] }}", options.join(", "))
            }
        }
    }
}

/// First occurrence of each name wins
pub fn dedupe_inputs(inputs: &[InferredInput]) -> Vec<&InferredInput> {
    let mut seen = HashSet::new();
    inputs.iter().filter(|i| seen.insert(i.name.as_str())).collect()
}

pub fn render_story(ctx: &HealContext<'_>) -> String {
    let inputs = dedupe_inputs(ctx.inputs);
    let class = &ctx.class_name;

    let mut arg_types = String::new();
    let mut args = String::new();
    for input in &inputs {
        let _ = writeln!(arg_types, "    {}: {},", input.name, Control::for_input(input).render());
        if let Some(default) = &input.default_value {
            let _ = writeln!(args, "    {}: {},", input.name, ts_default(input, default));
        }
    }

    format!(
        "import type {{ Meta, StoryObj }} from '@storybook/angular';\n\
         import {{ {class} }} from './{stem}.component';\n\
         \n\
         const meta: Meta<{class}> = {{\n  \
           title: 'Components/{title}',\n  \
           component: {class},\n  \
           argTypes: {{\n{arg_types}  }},\n  \
           args: {{\n{args}  }},\n\
         }};\n\
         \n\
         export default meta;\n\
         type Story = StoryObj<{class}>;\n\
         \n\
         export const Default: Story = {{}};\n",
        class = class,
        stem = ctx.kebab_name,
        title = class.trim_end_matches("Component"),
        arg_types = arg_types,
        args = args,
    )
}

pub fn heal(bundle: &mut ArtifactBundle, ctx: &HealContext<'_>) -> Result<(), HealError> {
    let usable = bundle
        .content(ArtifactKind::Doc)
        .map_or(false, |doc| doc.contains(DOC_MARKER));
    if usable {
        return Ok(());
    }

    tracing::debug!(inputs = ctx.inputs.len(), "regenerating story file");
    *bundle.slot(ArtifactKind::Doc) = Some(Artifact::new(ArtifactKind::Doc, ctx.artifact_name, render_story(ctx)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls() {
        assert_eq!(Control::for_input(&InferredInput::new("on", "boolean", None)), Control::Boolean);
        assert_eq!(
            Control::for_input(&InferredInput::new("v", "'a' | 'b'", None)),
            Control::Select(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(Control::for_input(&InferredInput::new("n", "number", None)), Control::Text);
    }

    #[test]
    fn test_story_deduplicates_inputs() {
        let inputs = [
            InferredInput::new("size", "'sm' | 'lg'", Some("sm")),
            InferredInput::new("size", "string", Some("lg")),
            InferredInput::new("disabled", "boolean", Some("false")),
        ];
        let ctx = HealContext::new("Chip", &inputs, None);
        let story = render_story(&ctx);

        assert_eq!(story.matches("size:").count(), 2);
        assert!(story.contains("    size: { control: 'select', options: ['sm', 'lg'] },"));
        assert!(story.contains("    size: 'sm',"));
        assert!(story.contains("    disabled: false,"));
        assert!(story.contains("const meta: Meta<ChipComponent> = {"));
        assert!(story.contains("import { ChipComponent } from './chip.component';"));
        assert!(story.contains("title: 'Components/Chip',"));
    }

    #[test]
    fn test_existing_story_kept() {
        let ctx = HealContext::new("Chip", &[], None);
        let existing = "const meta: Meta<ChipComponent> = { title: 'Custom' };";
        let mut bundle = ArtifactBundle {
            doc: Some(Artifact::new(ArtifactKind::Doc, "Chip", existing)),
            ..Default::default()
        };
        heal(&mut bundle, &ctx).unwrap();
        assert_eq!(bundle.content(ArtifactKind::Doc), Some(existing));
    }

    #[test]
    fn test_markerless_story_regenerated() {
        let ctx = HealContext::new("Chip", &[], None);
        let mut bundle = ArtifactBundle {
            doc: Some(Artifact::new(ArtifactKind::Doc, "Chip", "export default {};")),
            ..Default::default()
        };
        heal(&mut bundle, &ctx).unwrap();
        assert!(bundle.content(ArtifactKind::Doc).unwrap().contains(DOC_MARKER));
    }
}
