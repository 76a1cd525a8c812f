use crate::dialect::Flavor;
use crate::style::{format_declarations, format_style_object};
use crate::text::{escape_attribute, escape_jsx_text, escape_text};
use crate::tree::{is_raw_text_element, is_void_element, Element, Node, StyleMap};

/// Canonical printer for Document Trees
///
/// Output starts at the current column (no leading indentation) and nested
/// lines are indented relative to `indent_level`, so a patcher can splice the
/// result into existing text at any depth.
pub struct Serializer {
    flavor: Flavor,
    indent_level: usize,
    indent_string: String,
    quote: char,
}

impl Serializer {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            indent_level: 0,
            indent_string: "  ".to_string(),
            quote: '"',
        }
    }

    pub fn with_indent(flavor: Flavor, indent: &str) -> Self {
        Self {
            indent_string: indent.to_string(),
            ..Self::new(flavor)
        }
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Indentation depth of the line the output will be placed on
    pub fn at_level(mut self, level: usize) -> Self {
        self.indent_level = level;
        self
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_string
    }

    pub fn serialize(&mut self, node: &Node) -> String {
        let mut output = String::new();
        self.serialize_node(node, false, &mut output);
        output
    }

    fn serialize_node(&mut self, node: &Node, raw_parent: bool, output: &mut String) {
        match node {
            Node::Text(text) => self.serialize_text(&text.content, raw_parent, output),
            Node::Element(el) if node.is_synthetic_root() => self.serialize_root(el, output),
            Node::Element(el) => self.serialize_element(el, output),
        }
    }

    fn serialize_root(&mut self, root: &Element, output: &mut String) {
        match self.flavor {
            Flavor::Html => {
                for (i, child) in root.children.iter().enumerate() {
                    if i > 0 {
                        output.push('\n');
                        self.write_indent(output);
                    }
                    self.serialize_node(child, false, output);
                }
            }
            Flavor::Jsx => {
                output.push_str("<>");
                self.serialize_children(root, output);
                output.push_str("</>");
            }
        }
    }

    fn serialize_element(&mut self, el: &Element, output: &mut String) {
        output.push('<');
        output.push_str(&el.tag);
        self.serialize_attributes(el, output);

        if el.children.is_empty() {
            match self.flavor {
                Flavor::Jsx => output.push_str(" />"),
                Flavor::Html if is_void_element(&el.tag) => output.push('>'),
                Flavor::Html => {
                    output.push_str("></");
                    output.push_str(&el.tag);
                    output.push('>');
                }
            }
            return;
        }

        output.push('>');
        self.serialize_children(el, output);
        output.push_str("</");
        output.push_str(&el.tag);
        output.push('>');
    }

    fn serialize_children(&mut self, el: &Element, output: &mut String) {
        let raw = self.flavor == Flavor::Html && is_raw_text_element(&el.tag);
        if self.is_inline(el) {
            for child in &el.children {
                self.serialize_node(child, raw, output);
            }
            return;
        }

        self.indent_level += 1;
        for child in &el.children {
            output.push('\n');
            self.write_indent(output);
            self.serialize_node(child, raw, output);
        }
        self.indent_level -= 1;
        output.push('\n');
        self.write_indent(output);
    }

    /// HTML prints text-only content inline; JSX keeps any run with text on
    /// one line, since line breaks around JSX text are not significant.
    fn is_inline(&self, el: &Element) -> bool {
        match self.flavor {
            Flavor::Html => el.children.iter().all(Node::is_text),
            Flavor::Jsx => el.children.iter().any(Node::is_text),
        }
    }

    fn serialize_attributes(&self, el: &Element, output: &mut String) {
        for (name, value) in &el.attributes {
            output.push(' ');
            output.push_str(&self.attribute_text(name, value));
        }
        if !el.style.is_empty() {
            output.push(' ');
            output.push_str(&self.style_attribute_text(&el.style));
        }
    }

    /// One attribute as written in source, e.g. `className="card"`
    pub fn attribute_text(&self, name: &str, value: &str) -> String {
        if name.starts_with('{') {
            // spread
            return name.to_string();
        }
        let mut output = self.flavor.source_attribute_name(name).to_string();
        if value.is_empty() {
            return output;
        }
        output.push('=');
        if self.flavor == Flavor::Jsx && is_expression(value) {
            output.push_str(value);
        } else {
            self.write_quoted(value, &mut output);
        }
        output
    }

    /// The `style` attribute for a style map
    pub fn style_attribute_text(&self, style: &StyleMap) -> String {
        let mut output = String::from("style=");
        match self.flavor {
            Flavor::Html => self.write_quoted(&format_declarations(style), &mut output),
            Flavor::Jsx => output.push_str(&format_style_object(style, self.quote)),
        }
        output
    }

    fn write_quoted(&self, value: &str, output: &mut String) {
        output.push(self.quote);
        output.push_str(&escape_attribute(value, self.quote));
        output.push(self.quote);
    }

    fn serialize_text(&self, content: &str, raw_parent: bool, output: &mut String) {
        match self.flavor {
            _ if raw_parent => output.push_str(content),
            Flavor::Html => output.push_str(&escape_text(content)),
            Flavor::Jsx if is_expression(content) => output.push_str(content),
            Flavor::Jsx => output.push_str(&escape_jsx_text(content)),
        }
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

/// `{…}` values are JSX expressions, printed verbatim
pub fn is_expression(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('{') && value.ends_with('}')
}

/// Serialize a tree with default options
pub fn serialize(node: &Node, flavor: Flavor) -> String {
    Serializer::new(flavor).serialize(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_html() {
        let tree = Node::element("div")
            .with_attr("class", "card")
            .with_style("color", "red")
            .with_child(Node::element("h1").with_child(Node::text("Title")))
            .with_child(Node::element("img").with_attr("src", "a.png"));

        assert_eq!(
            serialize(&tree, Flavor::Html),
            "<div class=\"card\" style=\"color: red\">\n  <h1>Title</h1>\n  <img src=\"a.png\">\n</div>"
        );
    }

    #[test]
    fn test_serialize_jsx() {
        let tree = Node::element("label")
            .with_attr("class", "field")
            .with_attr("for", "name")
            .with_attr("onClick", "{handle}")
            .with_style("font-size", "12px")
            .with_child(Node::element("input"));

        assert_eq!(
            serialize(&tree, Flavor::Jsx),
            "<label className=\"field\" htmlFor=\"name\" onClick={handle} style={{ fontSize: \"12px\" }}>\n  <input />\n</label>"
        );
    }

    #[test]
    fn test_jsx_mixed_content_stays_inline() {
        let tree = Node::element("p")
            .with_child(Node::text("Hello "))
            .with_child(Node::text("{name}"))
            .with_child(Node::element("b").with_child(Node::text("!")));
        assert_eq!(serialize(&tree, Flavor::Jsx), "<p>Hello {name}<b>!</b></p>");
    }

    #[test]
    fn test_synthetic_root() {
        let tree = Node::root(vec![Node::element("h1"), Node::element("p")]);
        assert_eq!(serialize(&tree, Flavor::Html), "<h1></h1>\n<p></p>");
        assert_eq!(
            serialize(&tree, Flavor::Jsx),
            "<>\n  <h1 />\n  <p />\n</>"
        );
    }

    #[test]
    fn test_escaping() {
        let tree = Node::element("p")
            .with_attr("title", "a \"b\"")
            .with_child(Node::text("1 < 2 & 3"));
        assert_eq!(
            serialize(&tree, Flavor::Html),
            "<p title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3</p>"
        );
    }

    #[test]
    fn test_level_and_quote() {
        let tree = Node::element("ul").with_child(Node::element("li").with_attr("id", "a"));
        let out = Serializer::with_indent(Flavor::Jsx, "\t")
            .with_quote('\'')
            .at_level(2)
            .serialize(&tree);
        assert_eq!(out, "<ul>\n\t\t\t<li id='a' />\n\t\t</ul>");
    }

    #[test]
    fn test_boolean_attribute() {
        let tree = Node::element("input").with_attr("disabled", "");
        assert_eq!(serialize(&tree, Flavor::Html), "<input disabled>");
    }
}
