//! Patching of Vue single-file components, one section at a time.
//!
//! Every edit is confined to the inner byte range of the section it belongs
//! to, so the bytes of the other sections never change.

use crate::dialect::{DialectSyntax, FormatOptions, VueSyntax};
use crate::jsx_ast::{patch_jsx, ScriptParser};
use crate::text_patch::{apply_edits, text_edits, TextEdit};
use dragndrop_parser::{split_sections, Flavor, Node, Parser, Section};
use dragndrop_vdom::{apply, EditOperation, NodePath, PatchError};
use std::ops::Range;
use tracing::debug;

/// Operations for each section of a component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VuePatch {
    pub template: Vec<EditOperation>,
    /// Operations on the JSX rendered by the script
    pub script: Vec<EditOperation>,
    /// New content of the `<style>` section
    pub style: Option<String>,
}

impl VuePatch {
    pub fn template(operations: Vec<EditOperation>) -> Self {
        Self {
            template: operations,
            ..Self::default()
        }
    }

    pub fn style(content: impl Into<String>) -> Self {
        Self {
            style: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty() && self.script.is_empty() && self.style.is_none()
    }
}

pub fn patch_vue(
    source: &str,
    patch: &VuePatch,
    options: &FormatOptions,
    scripts: &dyn ScriptParser,
) -> Result<String, PatchError> {
    let sections = split_sections(source)?;
    let mut edits = Vec::new();

    if !patch.template.is_empty() {
        match &sections.template {
            Some(template) => {
                let parsed = Parser::bounded(source, Flavor::Html, template.content.clone()).parse_document()?;
                let template_edits = text_edits(source, &parsed, &patch.template, Flavor::Html, options)?;
                for edit in &template_edits {
                    confine(edit, &template.content)?;
                }
                edits.extend(template_edits);
            }
            None => {
                let mut tree = Node::root(Vec::new());
                apply(&mut tree, &patch.template)?;
                edits.push(TextEdit::new(0..0, VueSyntax.serialize(&tree, options)));
            }
        }
    }

    if !patch.script.is_empty() {
        let script = sections
            .script
            .as_ref()
            .ok_or_else(|| PatchError::unsupported(&NodePath::root(), "component has no <script> section"))?;
        let patched = patch_jsx(script.text(source), &patch.script, options, scripts)?;
        edits.push(TextEdit::new(script.content.clone(), patched));
    }

    if let Some(style) = &patch.style {
        edits.push(style_edit(source, sections.style.as_ref(), style));
    }

    debug!(
        template = patch.template.len(),
        script = patch.script.len(),
        style = patch.style.is_some(),
        edits = edits.len(),
        "Patching component sections"
    );
    apply_edits(source, edits)
}

fn confine(edit: &TextEdit, section: &Range<usize>) -> Result<(), PatchError> {
    if edit.range.start < section.start || edit.range.end > section.end {
        return Err(PatchError::InvalidEdit {
            start: edit.range.start,
            end: edit.range.end,
            reason: format!("edit leaves the section at {}..{}", section.start, section.end),
        });
    }
    Ok(())
}

fn style_edit(source: &str, section: Option<&Section>, content: &str) -> TextEdit {
    match section {
        Some(style) => TextEdit::new(style.content.clone(), content),
        None => {
            let separator = if source.is_empty() || source.ends_with('\n') { "" } else { "\n" };
            let mut body = content.to_string();
            if !body.starts_with('\n') {
                body.insert(0, '\n');
            }
            if !body.ends_with('\n') {
                body.push('\n');
            }
            TextEdit::new(source.len()..source.len(), format!("{separator}<style>{body}</style>\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsx_ast::JsxModuleParser;
    use dragndrop_parser::{parse, Dialect};
    use dragndrop_vdom::diff;

    const COMPONENT: &str = r#"<template>
  <div class="card">
    <h2>{{ title }}</h2>
  </div>
</template>

<script>
export default { props: ['title'] }
</script>

<style scoped>
.card { padding: 8px; }
</style>
"#;

    fn patch(source: &str, patch: &VuePatch) -> String {
        patch_vue(source, patch, &FormatOptions::default(), &JsxModuleParser).unwrap()
    }

    #[test]
    fn test_style_only_change_keeps_other_sections() {
        let out = patch(COMPONENT, &VuePatch::style("\n.card { padding: 16px; }\n"));
        let before = split_sections(COMPONENT).unwrap();
        let after = split_sections(&out).unwrap();

        let template = before.template.unwrap();
        let script = before.script.unwrap();
        assert_eq!(&out[..script.outer.end], &COMPONENT[..script.outer.end]);
        assert_eq!(after.template.unwrap().content, template.content);
        assert_eq!(after.style.unwrap().text(&out), "\n.card { padding: 16px; }\n");
        assert!(out.ends_with("</style>\n"));
    }

    #[test]
    fn test_template_edit_stays_in_template() {
        let old = parse(COMPONENT, Dialect::Vue).unwrap();
        let new = old.clone().with_attr("class", "card wide");
        let out = patch(COMPONENT, &VuePatch::template(diff(&old, &new)));

        assert_eq!(out, COMPONENT.replace("class=\"card\"", "class=\"card wide\""));
        assert_eq!(parse(&out, Dialect::Vue).unwrap(), new);
    }

    #[test]
    fn test_missing_sections_are_created() {
        let source = "<script>\nexport default {}\n</script>\n";
        let insert = diff(
            &Node::root(Vec::new()),
            &Node::root(vec![Node::element("p").with_child(Node::text("Hi"))]),
        );
        let out = patch(
            source,
            &VuePatch {
                template: insert,
                script: Vec::new(),
                style: Some("p { margin: 0; }".to_string()),
            },
        );
        assert_eq!(
            out,
            "<template>\n  <p>Hi</p>\n</template>\n<script>\nexport default {}\n</script>\n<style>\np { margin: 0; }\n</style>\n"
        );
    }

    #[test]
    fn test_script_render_markup() {
        let source = "<script>\nexport default {\n  render() {\n    return <p>Hi</p>;\n  }\n}\n</script>\n";
        let ops = diff(
            &Node::element("p").with_child(Node::text("Hi")),
            &Node::element("p").with_child(Node::text("Bye")),
        );
        let out = patch(
            source,
            &VuePatch {
                script: ops,
                ..VuePatch::default()
            },
        );
        assert_eq!(out, source.replace("Hi", "Bye"));
    }

    #[test]
    fn test_script_ops_without_script_fail() {
        let result = patch_vue(
            "<template><p></p></template>",
            &VuePatch {
                script: diff(&Node::element("p"), &Node::element("p").with_attr("id", "x")),
                ..VuePatch::default()
            },
            &FormatOptions::default(),
            &JsxModuleParser,
        );
        assert!(matches!(result, Err(PatchError::Unsupported { .. })));
    }
}
