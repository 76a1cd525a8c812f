//! # JSX/TSX patching through a syntax tree
//!
//! The module is parsed with oxc to find the markup its component renders
//! (see [`dragndrop_parser::locate_markup`]), then split into the code before
//! that markup, the markup itself (held as a JSX syntax tree) and the code
//! after it. Operations
//! mutate the tree; printing reassembles the module with the markup
//! reprinted at its original indentation.
//!
//! ```text
//!   export const Card = () => (   ← prefix, untouched
//!     <div className="card">      ← JsxElement, reprinted
//!       ...
//!     </div>
//!   );                            ← suffix, untouched
//! ```
//!
//! When the tree cannot express an operation (for example an attribute
//! update on an element carrying `{...spread}` props) the whole batch falls
//! back to byte-range editing of the previous text.

use crate::dialect::FormatOptions;
use crate::text_patch::patch_text;
use dragndrop_parser::serializer::is_expression;
use dragndrop_parser::style::parse_declarations;
use dragndrop_parser::{parse_jsx_document, Flavor, Node, ParseError, StyleMap};
use dragndrop_vdom::{AttributeDelta, EditOperation, NodePath, PatchError, PatchTarget};
use tracing::{debug, warn};

/// Parses script modules into patchable programs
pub trait ScriptParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Box<dyn ScriptProgram>, ParseError>;
}

pub trait ScriptProgram: Send {
    fn apply(&mut self, op: &EditOperation) -> Result<(), PatchError>;

    /// Print the whole module
    fn print(&self, options: &FormatOptions) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxAttribute {
    /// `name`, `name="value"` or `name={expression}`; `value` is the
    /// Document Tree value (expressions keep their braces)
    Named { name: String, value: String },
    /// `{...props}`
    Spread(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxChild {
    Element(JsxElement),
    Text(String),
    /// `{expression}`, braces included
    Expression(String),
}

/// A JSX element; a fragment has an empty name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxElement {
    pub name: String,
    pub attributes: Vec<JsxAttribute>,
    pub style: StyleMap,
    pub children: Vec<JsxChild>,
}

impl JsxElement {
    fn from_node(node: &Node) -> Self {
        match node {
            Node::Element(el) if node.is_synthetic_root() => Self {
                name: String::new(),
                attributes: Vec::new(),
                style: StyleMap::new(),
                children: el.children.iter().map(JsxChild::from_node).collect(),
            },
            Node::Element(el) => Self {
                name: el.tag.clone(),
                attributes: el
                    .attributes
                    .iter()
                    .map(|(name, value)| {
                        if name.starts_with("{...") {
                            JsxAttribute::Spread(name.clone())
                        } else {
                            JsxAttribute::Named {
                                name: name.clone(),
                                value: value.clone(),
                            }
                        }
                    })
                    .collect(),
                style: el.style.clone(),
                children: el.children.iter().map(JsxChild::from_node).collect(),
            },
            Node::Text(_) => Self {
                name: String::new(),
                attributes: Vec::new(),
                style: StyleMap::new(),
                children: vec![JsxChild::from_node(node)],
            },
        }
    }

    fn is_fragment(&self) -> bool {
        self.name.is_empty()
    }

    fn to_node(&self) -> Node {
        let children = self.children.iter().map(JsxChild::to_node).collect();
        if self.is_fragment() {
            return Node::root(children);
        }
        let mut node = Node::element(&self.name).with_children(children);
        for attribute in &self.attributes {
            node = match attribute {
                JsxAttribute::Named { name, value } => node.with_attr(name, value),
                JsxAttribute::Spread(spread) => node.with_attr(spread, ""),
            };
        }
        for (property, value) in &self.style {
            node = node.with_style(property, value);
        }
        node
    }

    fn has_spread(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| matches!(attribute, JsxAttribute::Spread(_)))
    }

    fn set_attribute(&mut self, key: &str, new_value: &str) {
        let existing = self.attributes.iter_mut().find_map(|attribute| match attribute {
            JsxAttribute::Named { name, value } if name == key => Some(value),
            _ => None,
        });
        match existing {
            Some(value) => *value = new_value.to_string(),
            None => self.attributes.push(JsxAttribute::Named {
                name: key.to_string(),
                value: new_value.to_string(),
            }),
        }
    }

    fn remove_attribute(&mut self, key: &str) {
        self.attributes
            .retain(|attribute| !matches!(attribute, JsxAttribute::Named { name, .. } if name == key));
    }
}

impl JsxChild {
    fn from_node(node: &Node) -> Self {
        match node {
            Node::Text(text) if is_expression(&text.content) => JsxChild::Expression(text.content.clone()),
            Node::Text(text) => JsxChild::Text(text.content.clone()),
            Node::Element(_) => JsxChild::Element(JsxElement::from_node(node)),
        }
    }

    fn to_node(&self) -> Node {
        match self {
            JsxChild::Element(el) => el.to_node(),
            JsxChild::Text(text) | JsxChild::Expression(text) => Node::text(text),
        }
    }
}

/// A JSX/TSX module with its rendered markup parsed
#[derive(Debug, Clone)]
pub struct JsxModule {
    prefix: String,
    markup: JsxElement,
    suffix: String,
    /// Indentation of the line the markup starts on
    indent: String,
}

impl JsxModule {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let document = parse_jsx_document(source)?;
        let region = document.region;
        let line_start = source[..region.start].rfind('\n').map_or(0, |i| i + 1);
        let indent: String = source[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();

        Ok(Self {
            prefix: source[..region.start].to_string(),
            markup: JsxElement::from_node(&document.parsed.tree),
            suffix: source[region.end..].to_string(),
            indent,
        })
    }

    pub fn markup(&self) -> &JsxElement {
        &self.markup
    }

    fn element_mut(&mut self, path: &NodePath) -> Result<&mut JsxElement, PatchError> {
        let mut element = &mut self.markup;
        for &index in path.indices() {
            element = match element.children.get_mut(index) {
                Some(JsxChild::Element(child)) => child,
                _ => return Err(PatchError::UnresolvedPath(path.clone())),
            };
        }
        Ok(element)
    }

    fn child_slot(&mut self, path: &NodePath) -> Result<(&mut Vec<JsxChild>, usize), PatchError> {
        let (parent, index) = path
            .split_last()
            .ok_or_else(|| PatchError::unsupported(path, "the markup root has no parent"))?;
        let children = &mut self.element_mut(&parent)?.children;
        if index >= children.len() {
            return Err(PatchError::UnresolvedPath(path.clone()));
        }
        Ok((children, index))
    }
}

impl PatchTarget for JsxModule {
    type Error = PatchError;

    fn insert(&mut self, parent: &NodePath, index: usize, node: &Node) -> Result<(), PatchError> {
        let children = &mut self.element_mut(parent)?.children;
        if index > children.len() {
            return Err(PatchError::UnresolvedPath(parent.child(index)));
        }
        children.insert(index, JsxChild::from_node(node));
        Ok(())
    }

    fn remove(&mut self, path: &NodePath) -> Result<(), PatchError> {
        let (children, index) = self.child_slot(path)?;
        children.remove(index);
        Ok(())
    }

    fn replace(&mut self, path: &NodePath, node: &Node) -> Result<(), PatchError> {
        if path.is_root() {
            self.markup = JsxElement::from_node(node);
            return Ok(());
        }
        let (children, index) = self.child_slot(path)?;
        children[index] = JsxChild::from_node(node);
        Ok(())
    }

    fn update_attributes(
        &mut self,
        path: &NodePath,
        attributes: &AttributeDelta,
        style: &AttributeDelta,
    ) -> Result<(), PatchError> {
        let element = self.element_mut(path)?;
        if element.has_spread() {
            return Err(PatchError::unsupported(
                path,
                "attribute update on an element with spread props",
            ));
        }
        for name in &attributes.removed {
            element.remove_attribute(name);
        }
        for (name, value) in attributes.assignments() {
            if name == "style" && !is_expression(value) {
                // a literal style string becomes an object literal
                element.style = parse_declarations(value);
                continue;
            }
            element.set_attribute(name, value);
        }
        style.apply_to(&mut element.style);
        Ok(())
    }

    fn update_text(&mut self, path: &NodePath, content: &str) -> Result<(), PatchError> {
        let (children, index) = self.child_slot(path)?;
        match &children[index] {
            JsxChild::Element(_) => Err(PatchError::UnresolvedPath(path.clone())),
            _ => {
                children[index] = JsxChild::from_node(&Node::text(content));
                Ok(())
            }
        }
    }

    fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: &NodePath,
        to_index: usize,
    ) -> Result<(), PatchError> {
        let (children, index) = self.child_slot(from)?;
        let child = children.remove(index);
        let target = &mut self.element_mut(to_parent)?.children;
        if to_index > target.len() {
            return Err(PatchError::UnresolvedPath(to_parent.child(to_index)));
        }
        target.insert(to_index, child);
        Ok(())
    }
}

impl ScriptProgram for JsxModule {
    fn apply(&mut self, op: &EditOperation) -> Result<(), PatchError> {
        self.apply_operation(op)
    }

    fn print(&self, options: &FormatOptions) -> String {
        let markup = options.serializer(Flavor::Jsx).serialize(&self.markup.to_node());
        let markup = if self.indent.is_empty() {
            markup
        } else {
            markup.replace('\n', &format!("\n{}", self.indent))
        };
        format!("{}{}{}", self.prefix, markup, self.suffix)
    }
}

/// Built-in parser producing [`JsxModule`]s. Reads `.jsx` and `.tsx` modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsxModuleParser;

impl ScriptParser for JsxModuleParser {
    fn parse(&self, source: &str) -> Result<Box<dyn ScriptProgram>, ParseError> {
        Ok(Box::new(JsxModule::parse(source)?))
    }
}

fn patch_ast(
    source: &str,
    ops: &[EditOperation],
    options: &FormatOptions,
    parser: &dyn ScriptParser,
) -> Result<String, PatchError> {
    let mut program = parser.parse(source)?;
    for op in ops {
        program.apply(op)?;
    }
    Ok(program.print(options))
}

/// Patch a JSX/TSX module: through its syntax tree, or with byte-range edits
/// when the tree strategy fails
pub fn patch_jsx(
    source: &str,
    ops: &[EditOperation],
    options: &FormatOptions,
    parser: &dyn ScriptParser,
) -> Result<String, PatchError> {
    match patch_ast(source, ops, options, parser) {
        Ok(text) => {
            debug!(operations = ops.len(), "Patched JSX syntax tree");
            Ok(text)
        }
        Err(error) => {
            warn!(%error, "JSX syntax tree patch failed, falling back to byte-range edits");
            let document = parse_jsx_document(source)?;
            patch_text(source, &document.parsed, ops, Flavor::Jsx, options)
        }
    }
}
