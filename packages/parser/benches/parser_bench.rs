use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dragndrop_parser::{parse, serialize, Dialect, Flavor};

fn landing_page(sections: usize) -> String {
    let mut html = String::from("<main id=\"page\">\n");
    for i in 0..sections {
        html.push_str(&format!(
            "  <section id=\"s{i}\" class=\"block\" style=\"padding: 16px; background: #fff\">\n    <h2>Section {i}</h2>\n    <p>Body copy for section {i} &amp; friends.</p>\n    <img src=\"/img/{i}.png\" alt=\"\">\n  </section>\n"
        ));
    }
    html.push_str("</main>\n");
    html
}

fn parse_small_page(c: &mut Criterion) {
    let source = landing_page(5);
    c.bench_function("parse_small_page", |b| {
        b.iter(|| parse(black_box(&source), Dialect::Html))
    });
}

fn parse_large_page(c: &mut Criterion) {
    let source = landing_page(200);
    c.bench_function("parse_large_page", |b| {
        b.iter(|| parse(black_box(&source), Dialect::Html))
    });
}

fn parse_jsx_component(c: &mut Criterion) {
    let source = format!(
        "export default function Page() {{\n  return (\n{}  );\n}}\n",
        landing_page(20).replace("class=", "className=").replace("style=\"padding: 16px; background: #fff\"", "style={{ padding: 16 }}")
    );
    c.bench_function("parse_jsx_component", |b| {
        b.iter(|| parse(black_box(&source), Dialect::Jsx))
    });
}

fn serialize_large_page(c: &mut Criterion) {
    let tree = match parse(&landing_page(200), Dialect::Html) {
        Ok(tree) => tree,
        Err(e) => panic!("benchmark fixture failed to parse: {e}"),
    };
    c.bench_function("serialize_large_page", |b| {
        b.iter(|| serialize(black_box(&tree), Flavor::Html))
    });
}

criterion_group!(
    benches,
    parse_small_page,
    parse_large_page,
    parse_jsx_component,
    serialize_large_page
);
criterion_main!(benches);
