//! Per-element edit plans.
//!
//! The compiler inspects an element without touching the document and records
//! everything it wants changed in an [`ElementEdits`]. Applying the plan is the
//! only place the tree is mutated, so the walk never sees a half-edited
//! sibling list.

use smol_str::SmolStr;
use vue_markup::{Document, NodeId};

/// A change to one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeEdit {
    Remove(SmolStr),
    /// Swap `old` for `name=value`, keeping its position.
    Replace {
        old: SmolStr,
        name: SmolStr,
        value: String,
    },
}

/// Everything to change on and around one element.
#[derive(Debug, Default)]
pub struct ElementEdits {
    /// Text inserted before the element, in output order.
    pub before: Vec<String>,
    /// Text inserted after the element, in output order.
    pub after: Vec<String>,
    /// Closing tag of a conditional group, placed after everything in `after`.
    pub close_if: Option<String>,
    /// Rewrites the previous group's closing node into a continuation.
    pub continue_chain: Option<(NodeId, String)>,
    pub attributes: Vec<AttributeEdit>,
    /// New contents for child text nodes.
    pub text_rewrites: Vec<(NodeId, String)>,
    /// Child nodes swapped for text.
    pub child_replacements: Vec<(NodeId, String)>,
    /// Replaces all children with a single text node.
    pub content: Option<String>,
    /// Replaces the element itself with a text node.
    pub replacement: Option<String>,
}

/// What [`ElementEdits::apply`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// The element, or the text node that replaced it.
    pub node: NodeId,
    /// The inserted closing tag of a conditional group.
    pub close_if: Option<NodeId>,
}

impl ElementEdits {
    pub fn apply(self, document: &mut Document, element: NodeId) -> Applied {
        if let Some((cursor, text)) = self.continue_chain {
            document.set_text(cursor, text);
        }

        if let Some(el) = document.element_mut(element) {
            for edit in self.attributes {
                match edit {
                    AttributeEdit::Remove(name) => {
                        el.attributes.remove(&name);
                    }
                    AttributeEdit::Replace { old, name, value } => {
                        el.attributes.replace(&old, name, value);
                    }
                }
            }
        }

        for (child, text) in self.text_rewrites {
            document.set_text(child, text);
        }
        for (child, text) in self.child_replacements {
            let new = document.create_text(text);
            document.replace(child, new);
        }

        if let Some(content) = self.content {
            document.clear_children(element);
            let text = document.create_text(content);
            document.append_child(element, text);
        }

        for text in self.before {
            let new = document.create_text(text);
            document.insert_before(element, new);
        }

        let mut anchor = element;
        for text in self.after {
            let new = document.create_text(text);
            document.insert_after(anchor, new);
            anchor = new;
        }
        let close_if = self.close_if.map(|text| {
            let new = document.create_text(text);
            document.insert_after(anchor, new);
            new
        });

        let node = match self.replacement {
            Some(text) => {
                let new = document.create_text(text);
                document.replace(element, new);
                new
            }
            None => element,
        };

        Applied { node, close_if }
    }
}
