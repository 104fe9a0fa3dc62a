//! Document serialization back to markup text.

use crate::dom::{Document, Element, NodeId, NodeKind};
use crate::parser::is_void_element;

/// Serializes `node` and its subtree.
///
/// Text and comments are written exactly as stored; attribute values are
/// always double-quoted with `"` escaped.
pub fn serialize(document: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(document, node, &mut out);
    out
}

fn write_node(document: &Document, node: NodeId, out: &mut String) {
    match document.kind(node) {
        NodeKind::Document => write_children(document, node, out),
        NodeKind::Text(text) => out.push_str(&text.data),
        NodeKind::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.data);
            out.push_str("-->");
        }
        NodeKind::Element(element) => write_element(document, node, element, out),
    }
}

fn write_children(document: &Document, node: NodeId, out: &mut String) {
    for &child in document.children(node) {
        write_node(document, child, out);
    }
}

fn write_element(document: &Document, node: NodeId, element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }

    let children = document.children(node);
    if element.self_closing && children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if is_void_element(&element.name) && children.is_empty() {
        return;
    }

    write_children(document, node, out);
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
