//! Snapshot tests for the markup parser.

use vue_markup::{parse, serialize, Document, NodeId, NodeKind};

fn dump(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match doc.kind(id) {
        NodeKind::Document => out.push_str("Document\n"),
        NodeKind::Element(el) => {
            out.push_str(&format!("{}Element <{}>", indent, el.name));
            for (name, value) in el.attributes.iter() {
                match value {
                    Some(value) => out.push_str(&format!(" {}={:?}", name, value)),
                    None => out.push_str(&format!(" {}", name)),
                }
            }
            if el.self_closing {
                out.push_str(" (self-closing)");
            }
            out.push('\n');
        }
        NodeKind::Text(text) => out.push_str(&format!("{}Text {:?}\n", indent, text.data)),
        NodeKind::Comment(c) => out.push_str(&format!("{}Comment {:?}\n", indent, c.data)),
    }
    for &child in doc.children(id) {
        dump(doc, child, depth + 1, out);
    }
}

fn tree(source: &str) -> String {
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let mut out = String::new();
    dump(&result.document, result.document.root(), 0, &mut out);
    out
}

#[test]
fn test_directive_heavy_template() {
    insta::assert_snapshot!(
        tree(r#"<template><ul class="list"><li v-for="(item, i) in items" :key="item.id" @click="pick(item)">{{ item.label }}</li><li v-else>none</li></ul></template>"#),
        @r#"
    Document
      Element <template>
        Element <ul> class="list"
          Element <li> v-for="(item, i) in items" :key="item.id" @click="pick(item)"
            Text "{{ item.label }}"
          Element <li> v-else
            Text "none"
    "#
    );
}

#[test]
fn test_components_and_comments() {
    insta::assert_snapshot!(
        tree("<div><!-- hint --><UserCard :user=\"u\"/><img src=\"a.png\"></div>"),
        @r#"
    Document
      Element <div>
        Comment " hint "
        Element <UserCard> :user="u" (self-closing)
        Element <img> src="a.png"
    "#
    );
}

#[test]
fn test_full_sfc_roundtrip() {
    let source = r#"<template>
  <div id="app">
    <h1 v-if="title">{{ title }}</h1>
    <p v-else>Untitled</p>
  </div>
</template>

<script>
export default { data: () => ({ title: '<b>' }) }
</script>
"#;
    let result = parse(source);
    assert!(result.errors.is_empty());
    assert_eq!(serialize(&result.document, result.document.root()), source);
}
