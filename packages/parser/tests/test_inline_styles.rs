use dragndrop_parser::{parse, Dialect, Node};

fn style_of(tree: &Node) -> Vec<(String, String)> {
    tree.as_element()
        .map(|el| el.style.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

#[test]
fn test_inline_style_without_trailing_semicolon() {
    let tree = parse(r#"<div style="padding: 16px; background: #FF0000">Hello</div>"#, Dialect::Html).unwrap();
    assert_eq!(
        style_of(&tree),
        vec![
            ("padding".to_string(), "16px".to_string()),
            ("background".to_string(), "#FF0000".to_string()),
        ]
    );
}

#[test]
fn test_inline_style_with_trailing_semicolon() {
    let tree = parse(r#"<div style="padding: 16px;">Hello</div>"#, Dialect::Html).unwrap();
    assert_eq!(style_of(&tree), vec![("padding".to_string(), "16px".to_string())]);
}

#[test]
fn test_html_and_jsx_styles_agree() {
    let html = parse(
        r#"<p style="font-size: 14px; line-height: 1.5; margin: 0">x</p>"#,
        Dialect::Html,
    )
    .unwrap();
    let jsx = parse(
        "const P = () => <p style={{ fontSize: 14, lineHeight: 1.5, margin: 0 }}>x</p>;",
        Dialect::Tsx,
    )
    .unwrap();
    assert_eq!(html, jsx);
}

#[test]
fn test_style_never_appears_as_attribute() {
    let tree = parse(r#"<div class="a" style="color: red"></div>"#, Dialect::Html).unwrap();
    let el = tree.as_element().unwrap();
    assert_eq!(el.attributes.keys().collect::<Vec<_>>(), vec!["class"]);
}
