/// Round-trip tests: serialized output parses back to the same tree
use crate::*;

fn assert_html_roundtrip(source: &str) {
    let tree = parse(source, Dialect::Html).unwrap_or_else(|e| panic!("Failed to parse {source}: {e}"));
    let serialized = serialize(&tree, Flavor::Html);
    let reparsed = parse(&serialized, Dialect::Html)
        .unwrap_or_else(|e| panic!("Failed to reparse {serialized}: {e}"));
    assert_eq!(tree, reparsed, "round trip changed the tree:\n{serialized}");
}

fn assert_jsx_roundtrip(markup: &str) {
    let module = format!("export default () => (\n  {markup}\n);\n");
    let tree = parse(&module, Dialect::Jsx).unwrap_or_else(|e| panic!("Failed to parse {markup}: {e}"));
    let serialized = serialize(&tree, Flavor::Jsx);
    let wrapped = format!("const A = () => {serialized};");
    let reparsed = parse(&wrapped, Dialect::Jsx)
        .unwrap_or_else(|e| panic!("Failed to reparse {serialized}: {e}"));
    assert_eq!(tree, reparsed, "round trip changed the tree:\n{serialized}");
}

#[test]
fn test_roundtrip_html_documents() {
    let sources = [
        "<div></div>",
        "<div><p>Hi</p></div>",
        r#"<div id="app" class="a b"><h1 style="color: red; font-size: 2em">Title</h1><img src="x.png" alt=""></div>"#,
        "<ul>\n  <li>One</li>\n  <li>Two &amp; three</li>\n</ul>",
        "<!DOCTYPE html>\n<html><head><title>T</title></head><body><p>a <!-- c --> b</p></body></html>",
        "<p>text</p><p>more</p>",
        "<section><my-widget data-x='1'/><br>tail text</section>",
        "<div><script>if (a < b) { run(); }</script><style>.a > .b { color: red }</style></div>",
        "<button disabled onclick=\"go('x')\">Go</button>",
        "loose text only",
        "",
    ];

    for source in sources {
        assert_html_roundtrip(source);
    }
}

#[test]
fn test_roundtrip_jsx_markup() {
    let sources = [
        r#"<div className="app"><h1>Hello</h1></div>"#,
        r#"<label htmlFor="x" style={{ marginTop: 4, color: "red" }}>Name</label>"#,
        "<p>Hello {user.name}, you have {count} messages</p>",
        "<ul>{items.map(item => <li key={item.id}>{item.label}</li>)}</ul>",
        "<>\n    <Header title=\"x\" />\n    <Footer />\n  </>",
        "<Button onClick={() => setOpen(true)} {...props}>Open</Button>",
    ];

    for source in sources {
        assert_jsx_roundtrip(source);
    }
}

#[test]
fn test_serializer_output_is_stable() {
    let source = "<div>\n<p  class='x'>A</p>\n\n   <p>B</p></div>";
    let tree = parse(source, Dialect::Html).unwrap();
    let once = serialize(&tree, Flavor::Html);
    let twice = serialize(&parse(&once, Dialect::Html).unwrap(), Flavor::Html);
    assert_eq!(once, twice);
    assert_eq!(once, "<div>\n  <p class=\"x\">A</p>\n  <p>B</p>\n</div>");
}
