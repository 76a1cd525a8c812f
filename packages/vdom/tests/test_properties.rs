use dragndrop_parser::Node;
use dragndrop_vdom::{apply, diff, patch_visual, render_full, Adapter, HeadlessDom};
use proptest::prelude::*;

const TAGS: &[&str] = &["div", "section", "p", "span", "li"];
const IDS: &[&str] = &["a", "b", "c", "d"];
const CLASSES: &[&str] = &["card", "row", "wide", "dark"];
const COLORS: &[&str] = &["red", "blue"];

fn arb_element_with(children: impl Strategy<Value = Vec<Node>>) -> impl Strategy<Value = Node> {
    (
        prop::sample::select(TAGS),
        prop::option::of(prop::sample::select(IDS)),
        prop::option::of(prop::sample::select(CLASSES)),
        prop::option::of(prop::sample::select(COLORS)),
        children,
    )
        .prop_map(|(tag, id, class, color, children)| {
            let mut node = Node::element(tag);
            if let Some(id) = id {
                node = node.with_attr("id", id);
            }
            if let Some(class) = class {
                node = node.with_attr("class", class);
            }
            if let Some(color) = color {
                node = node.with_style("color", color);
            }
            node.with_children(children)
        })
}

/// Element trees whose children are either one text run or only elements.
/// Small id and tag pools make keyed matches, moves and replaces common.
fn arb_tree() -> impl Strategy<Value = Node> {
    let text = prop::collection::vec("[a-z]{1,4}", 1..3).prop_map(|words| Node::text(words.join(" ")));
    let leaf = arb_element_with(prop::option::of(text).prop_map(|text| text.into_iter().collect()));
    leaf.prop_recursive(3, 24, 4, |inner| arb_element_with(prop::collection::vec(inner, 0..5)))
}

proptest! {
    #[test]
    fn prop_apply_diff_reaches_target(old in arb_tree(), new in arb_tree()) {
        let ops = diff(&old, &new);
        let mut tree = old.clone();
        apply(&mut tree, &ops).unwrap();
        prop_assert_eq!(&tree, &new);
        prop_assert!(diff(&new, &new).is_empty());
    }

    #[test]
    fn prop_visual_patch_reaches_target(old in arb_tree(), new in arb_tree()) {
        let adapter = Adapter::default();
        let mut dom = HeadlessDom::new();
        render_full(&mut dom, adapter.filter(), &old).unwrap();
        prop_assert_eq!(&adapter.adapt(&dom), &old);

        let ops = diff(&old, &new);
        patch_visual(&mut dom, adapter.filter(), &old, &ops).unwrap();
        prop_assert_eq!(&adapter.adapt(&dom), &new);
    }
}
