//! Arena-backed markup document.
//!
//! Nodes live in a flat arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Parent/child links are ids, so the compiler can hold on to a
//! node (for example the closing tag of an open `v-if` chain) while the tree
//! around it keeps changing.

use crate::Span;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena slot of this node.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The attributes of an element, in source order.
///
/// A value of `None` marks a valueless attribute such as `v-else` or `disabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    map: IndexMap<SmolStr, Option<String>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if the attribute is present, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Returns the attribute value. Valueless attributes read as `""`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(name)
            .map(|value| value.as_deref().unwrap_or(""))
    }

    /// Sets an attribute value. An existing attribute keeps its position.
    pub fn set(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        self.map.insert(name.into(), Some(value.into()));
    }

    /// Sets a valueless attribute.
    pub fn set_valueless(&mut self, name: impl Into<SmolStr>) {
        self.map.insert(name.into(), None);
    }

    /// Removes an attribute, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        self.map.shift_remove(name)
    }

    /// Puts `name=value` where `old` was and removes `old`.
    ///
    /// If `name` is already present it is updated where it stands instead.
    pub fn replace(&mut self, old: &str, name: impl Into<SmolStr>, value: impl Into<String>) {
        let name = name.into();
        let value = Some(value.into());
        if self.map.contains_key(&name) {
            self.map.insert(name.clone(), value);
            if name != old {
                self.map.shift_remove(old);
            }
            return;
        }
        match self.map.get_index_of(old) {
            Some(index) => {
                self.map.shift_remove_index(index);
                self.map.shift_insert(index, name, value);
            }
            None => {
                self.map.insert(name, value);
            }
        }
    }

    /// Returns a snapshot of the attribute names.
    pub fn names(&self) -> Vec<SmolStr> {
        self.map.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.map
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The tag name as written.
    pub name: SmolStr,
    pub attributes: Attributes,
    /// Whether the tag was written as `<name/>`.
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            self_closing: false,
        }
    }
}

/// A text node.
///
/// Holds template text as written as well as control tags synthesized by
/// the compiler; the two are not distinguished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub data: String,
}

/// A `<!-- -->` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub data: String,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic root holding top-level nodes.
    Document,
    Element(Element),
    Text(Text),
    Comment(Comment),
}

/// A node slot in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed markup document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                span: Span::default(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the synthetic document root.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.index()].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the payload of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            NodeKind::Text(text) => Some(&text.data),
            _ => None,
        }
    }

    /// Replaces the payload of a text node. Other node kinds are left alone.
    pub fn set_text(&mut self, id: NodeId, data: impl Into<String>) {
        if let NodeKind::Text(text) = &mut self.nodes[id.index()].kind {
            text.data = data.into();
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    /// Allocates a detached node.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocates a detached text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(Text { data: data.into() }), Span::default())
    }

    /// Allocates a detached element.
    pub fn create_element(&mut self, name: impl Into<SmolStr>) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(name)), Span::default())
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Inserts `new` immediately before `reference`.
    ///
    /// If `reference` is detached, `new` stays detached.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        self.insert_at_offset(reference, new, 0);
    }

    /// Inserts `new` immediately after `reference`.
    ///
    /// If `reference` is detached, `new` stays detached.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        self.insert_at_offset(reference, new, 1);
    }

    fn insert_at_offset(&mut self, reference: NodeId, new: NodeId, offset: usize) {
        self.detach(new);
        let Some(parent) = self.parent(reference) else {
            return;
        };
        let Some(position) = self.position_in_parent(parent, reference) else {
            return;
        };
        self.nodes[new.index()].parent = Some(parent);
        self.nodes[parent.index()]
            .children
            .insert(position + offset, new);
    }

    /// Puts `new` where `old` is and detaches `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Detaches every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for child in children {
            self.nodes[child.index()].parent = None;
        }
    }

    /// Removes `id` from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.index()].parent.take() else {
            return;
        };
        self.nodes[parent.index()].children.retain(|&child| child != id);
    }

    fn position_in_parent(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Returns `id` and all its attached descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Returns the first element named `tag` in document order.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.element(id).is_some_and(|el| el.name == tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, div);
        let span = doc.create_element("span");
        doc.append_child(div, span);
        (doc, div, span)
    }

    #[test]
    fn test_attributes_keep_order() {
        let mut attrs = Attributes::new();
        attrs.set("id", "a");
        attrs.set_valueless("v-else");
        attrs.set("class", "b");
        attrs.remove("v-else");
        attrs.set("id", "c");
        let names: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "class"]);
        assert_eq!(attrs.get("id"), Some("c"));
    }

    #[test]
    fn test_attribute_replace_keeps_position() {
        let mut attrs = Attributes::new();
        attrs.set(":href", "url");
        attrs.set("class", "a");
        attrs.replace(":href", "href", "{{ url }}");
        let names: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["href", "class"]);

        attrs.set(":class", "extra");
        attrs.replace(":class", "class", "a b");
        let names: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["href", "class"]);
        assert_eq!(attrs.get("class"), Some("a b"));
    }

    #[test]
    fn test_valueless_attribute_reads_empty() {
        let mut attrs = Attributes::new();
        attrs.set_valueless("disabled");
        assert_eq!(attrs.get("disabled"), Some(""));
        assert!(attrs.contains("disabled"));
        assert_eq!(attrs.get("missing"), None);
    }

    #[test]
    fn test_insert_around() {
        let (mut doc, div, span) = sample();
        let before = doc.create_text("B");
        let after = doc.create_text("A");
        doc.insert_before(span, before);
        doc.insert_after(span, after);
        assert_eq!(doc.children(div), &[before, span, after]);
        assert_eq!(doc.parent(after), Some(div));
    }

    #[test]
    fn test_insert_next_to_detached_is_noop() {
        let mut doc = Document::new();
        let lonely = doc.create_element("p");
        let text = doc.create_text("x");
        doc.insert_after(lonely, text);
        assert_eq!(doc.parent(text), None);
    }

    #[test]
    fn test_replace() {
        let (mut doc, div, span) = sample();
        let text = doc.create_text("{% include 'x' %}");
        doc.replace(span, text);
        assert_eq!(doc.children(div), &[text]);
        assert_eq!(doc.parent(span), None);
    }

    #[test]
    fn test_find_element_document_order() {
        let (mut doc, div, _) = sample();
        let nested = doc.create_element("template");
        doc.append_child(div, nested);
        let top = doc.create_element("template");
        let root = doc.root();
        doc.append_child(root, top);
        assert_eq!(doc.find_element("template"), Some(nested));
    }

    #[test]
    fn test_set_text_only_touches_text() {
        let (mut doc, div, _) = sample();
        let text = doc.create_text("{% endif %}");
        doc.set_text(text, "{% else %}");
        doc.set_text(div, "ignored");
        assert_eq!(doc.text(text), Some("{% else %}"));
        assert!(doc.is_element(div));
    }
}
