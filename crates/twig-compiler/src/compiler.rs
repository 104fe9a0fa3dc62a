//! Directive transformation over the markup tree.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, warn};
use vue_markup::{serialize, Document, NodeId, NodeKind};

use crate::binding::BindingValue;
use crate::builder::{Delimiters, Property, TwigBuilder};
use crate::chain::{ChainCursor, ChainMode};
use crate::directives::{
    binding_name, is_event_handler, ForDirective, V_ELSE, V_ELSE_IF, V_FOR, V_HTML, V_IF, V_SHOW,
    V_TEXT,
};
use crate::edits::{AttributeEdit, ElementEdits};
use crate::error::{CompileError, CompileResult};
use crate::expression::{rewrite_condition, rewrite_interpolation};
use crate::finisher::{finish, sentinel_interpolation};

/// Options for a conversion.
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    pub delimiters: Delimiters,
    pub chain_mode: ChainMode,
    /// Render block tags as `{%- … -%}`.
    pub trim_blocks: bool,
    /// Turn markup comments into Twig comments.
    pub twig_comments: bool,
    /// Component tag name to partial path.
    pub components: IndexMap<String, String>,
    /// Variable name to default expression, emitted before the root element.
    pub defaults: IndexMap<String, String>,
}

/// Converts one template.
///
/// A compiler carries the conditional chain cursor, so each conversion needs
/// its own instance.
#[derive(Debug)]
pub struct Compiler {
    options: CompilerOptions,
    builder: TwigBuilder,
    cursor: ChainCursor,
    container: Option<NodeId>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        debug!(chain_mode = ?options.chain_mode, "new compiler instance");
        let builder = TwigBuilder::new(options.delimiters.clone()).with_trim(options.trim_blocks);
        let cursor = ChainCursor::new(options.chain_mode);
        Self {
            options,
            builder,
            cursor,
            container: None,
        }
    }

    /// Converts the document's template into Twig source.
    ///
    /// The document is rewritten in place and should not be reused.
    pub fn convert(&mut self, document: &mut Document) -> CompileResult<String> {
        let template = document
            .find_element("template")
            .ok_or(CompileError::MissingTemplate)?;
        let root = root_element(document, template)?;
        self.container = Some(template);

        let first_synthesized = document.len();
        let result = self.transform(document, root)?;

        let mut output = self.prelude();
        // Control tags attached to the root element sit next to it inside the
        // template container.
        for &child in document.children(template) {
            if child == result || child.index() >= first_synthesized {
                output.push_str(&serialize(document, child));
            }
        }

        let (open, close) = &self.options.delimiters.tag_variable;
        Ok(finish(&output, open, close))
    }

    fn prelude(&self) -> String {
        let mut out = String::new();
        for (name, default) in &self.options.defaults {
            out.push_str(&self.builder.create_default_for_variable(name, default));
            out.push('\n');
        }
        out
    }

    /// Rewrites `node` and its subtree, returning the node now standing in its
    /// place. Only component inclusion returns a different node.
    pub fn transform(&mut self, document: &mut Document, node: NodeId) -> CompileResult<NodeId> {
        match document.kind(node) {
            NodeKind::Element(_) => {}
            NodeKind::Text(_) | NodeKind::Comment(_) => return Ok(node),
            NodeKind::Document => {
                warn!("document node handed to transform");
                for child in document.children(node).to_vec() {
                    self.transform(document, child)?;
                }
                return Ok(node);
            }
        }

        let chain_key = document.parent(node).unwrap_or(node);
        let edits = self.plan(document, node, chain_key)?;
        let applied = edits.apply(document, node);
        if let Some(close) = applied.close_if {
            self.cursor.set(chain_key, close);
        }
        if applied.node != node {
            return Ok(applied.node);
        }

        for child in document.children(node).to_vec() {
            self.transform(document, child)?;
        }

        if self.is_wrapper(document, node) {
            debug!("unwrap nested <template>");
            for child in document.children(node).to_vec() {
                document.insert_before(node, child);
            }
            document.detach(node);
        }

        Ok(node)
    }

    /// A `<template>` inside the root only groups its children.
    fn is_wrapper(&self, document: &Document, node: NodeId) -> bool {
        let is_template = document
            .element(node)
            .is_some_and(|element| element.name == "template");
        let parent = document.parent(node);
        is_template && parent.is_some() && parent != self.container
    }

    /// Works out every change for one element without touching the tree.
    fn plan(
        &mut self,
        document: &Document,
        node: NodeId,
        chain_key: NodeId,
    ) -> CompileResult<ElementEdits> {
        let mut edits = ElementEdits::default();
        let Some(element) = document.element(node) else {
            return Ok(edits);
        };
        let attributes = &element.attributes;
        let tag = element.name.clone();
        let span = document.span(node);

        // `v-show` joins the conditional chain as a `v-if` and wins over it.
        let if_directive = if attributes.contains(V_SHOW) {
            debug!(%tag, "v-show treated as v-if");
            Some(V_SHOW)
        } else if attributes.contains(V_IF) {
            Some(V_IF)
        } else {
            None
        };
        let chain_directive = if_directive
            .or_else(|| attributes.contains(V_ELSE_IF).then_some(V_ELSE_IF))
            .or_else(|| attributes.contains(V_ELSE).then_some(V_ELSE));

        match chain_directive {
            Some(directive @ (V_SHOW | V_IF)) => {
                let condition = required_condition(element, directive, span)?;
                let open = self.builder.create_if(condition);
                debug!(%tag, control = %open, "open conditional");
                edits.before.push(open);
                edits.close_if = Some(self.builder.create_end_if());
            }
            Some(V_ELSE_IF) => {
                let condition = required_condition(element, V_ELSE_IF, span)?;
                let cursor = self.chain_cursor(chain_key, &tag, V_ELSE_IF, span)?;
                let control = self.builder.create_else_if(condition);
                debug!(%tag, control = %control, "continue conditional");
                edits.continue_chain = Some((cursor, control));
                edits.close_if = Some(self.builder.create_end_if());
            }
            Some(_) => {
                let cursor = self.chain_cursor(chain_key, &tag, V_ELSE, span)?;
                let control = self.builder.create_else();
                debug!(%tag, control = %control, "continue conditional");
                edits.continue_chain = Some((cursor, control));
                edits.close_if = Some(self.builder.create_end_if());
            }
            None => self.cursor.reset(chain_key),
        }
        // Directives that lost to the one above are dropped too.
        for directive in [V_SHOW, V_IF, V_ELSE_IF, V_ELSE] {
            if attributes.contains(directive) {
                edits.attributes.push(AttributeEdit::Remove(directive.into()));
            }
        }

        for (name, _) in attributes.iter() {
            if is_event_handler(name) {
                debug!(%tag, attribute = name, "strip event handler");
                edits.attributes.push(AttributeEdit::Remove(name.into()));
            }
        }

        if let Some(value) = attributes.get(V_FOR) {
            let directive =
                ForDirective::parse(value).map_err(|reason| CompileError::MalformedDirective {
                    tag: tag.clone(),
                    attribute: V_FOR.into(),
                    value: value.to_string(),
                    reason,
                    span,
                })?;
            let open = self.open_loop(&directive);
            debug!(%tag, control = %open, "open loop");
            edits.before.push(open);
            edits.after.push(self.builder.create_end_for());
            edits.attributes.push(AttributeEdit::Remove(V_FOR.into()));
        }

        if let Some(path) = self.options.components.get(tag.as_str()) {
            let properties = component_properties(&self.builder, document, node);
            if document
                .children(node)
                .iter()
                .any(|&child| !is_blank(document, child))
            {
                warn!(%tag, "slot content of included component discarded");
            }
            debug!(%tag, partial = %path, "include component");
            edits.replacement = Some(self.builder.create_include_partial(path, properties));
            return Ok(edits);
        }

        if let Some(expression) = attributes.get(V_HTML) {
            let raw = format!("{}|raw", rewrite_condition(expression));
            edits.content = Some(self.builder.create_variable_output(&raw, None));
            edits.attributes.push(AttributeEdit::Remove(V_HTML.into()));
        } else if let Some(expression) = attributes.get(V_TEXT) {
            let rewritten = rewrite_condition(expression);
            edits.content = Some(self.builder.create_variable_output(&rewritten, None));
            edits.attributes.push(AttributeEdit::Remove(V_TEXT.into()));
        }

        self.plan_bindings(element, span, &mut edits)?;

        if edits.content.is_none() {
            self.plan_children(document, node, &mut edits);
        }

        Ok(edits)
    }

    fn chain_cursor(
        &self,
        chain_key: NodeId,
        tag: &SmolStr,
        directive: &'static str,
        span: vue_markup::Span,
    ) -> CompileResult<NodeId> {
        self.cursor
            .get(chain_key)
            .ok_or_else(|| CompileError::ChainState {
                tag: tag.clone(),
                directive,
                span,
            })
    }

    fn open_loop(&self, directive: &ForDirective) -> String {
        // `n in 10` counts from one in Vue.
        // Twig ranges count down, so `n in 0` must not become `1..0`.
        let list = match directive.list.parse::<u64>() {
            Ok(0) => "[]".to_string(),
            Ok(count) => format!("1..{count}"),
            Err(_) => directive.list.clone(),
        };
        let mut open = match &directive.key {
            Some(key) => self
                .builder
                .create_for_key_and_item_in_list(key, &directive.item, &list),
            None => self.builder.create_for_item_in_list(&directive.item, &list),
        };
        if let Some(index) = &directive.index {
            open.push(' ');
            open.push_str(&self.builder.create_variable(index, "loop.index0"));
        }
        open
    }

    fn plan_bindings(
        &self,
        element: &vue_markup::Element,
        span: vue_markup::Span,
        edits: &mut ElementEdits,
    ) -> CompileResult<()> {
        let attributes = &element.attributes;
        for (attribute, value) in attributes.iter() {
            let Some(name) = binding_name(attribute) else {
                debug!(attribute, "skip attribute");
                continue;
            };
            let value = value.unwrap_or("");
            if name.is_empty() {
                return Err(CompileError::MalformedDirective {
                    tag: element.name.clone(),
                    attribute: attribute.into(),
                    value: value.to_string(),
                    reason: "empty binding name",
                    span,
                });
            }
            debug!(attribute, name, value, "handle binding");

            let rendered = match name {
                "key" => {
                    edits.attributes.push(AttributeEdit::Remove(attribute.into()));
                    continue;
                }
                "class" | "style" => {
                    let bound = match BindingValue::classify(value) {
                        BindingValue::RawExpression(expression) => {
                            sentinel_interpolation(expression.trim())
                        }
                        BindingValue::ObjectLiteral(expression) => {
                            warn!(
                                tag = %element.name,
                                attribute,
                                "object literal binding passed through unflattened"
                            );
                            sentinel_interpolation(expression.trim())
                        }
                        BindingValue::TruthMap(map) if name == "class" => {
                            BindingValue::flatten_class(&map)
                        }
                        BindingValue::TruthMap(map) => BindingValue::flatten_style(&map),
                    };
                    merge_static(name, attributes.get(name), bound)
                }
                _ if value == "true" => name.to_string(),
                _ => sentinel_interpolation(&rewrite_condition(value)),
            };

            edits.attributes.push(AttributeEdit::Replace {
                old: attribute.into(),
                name: name.into(),
                value: rendered,
            });
        }
        Ok(())
    }

    /// Rewrites interpolations in child text and, if enabled, child comments.
    fn plan_children(&self, document: &Document, node: NodeId, edits: &mut ElementEdits) {
        for &child in document.children(node) {
            match document.kind(child) {
                NodeKind::Text(text) => {
                    let rewritten = rewrite_interpolation(&text.data);
                    if rewritten != text.data {
                        edits.text_rewrites.push((child, rewritten));
                    }
                }
                NodeKind::Comment(comment) if self.options.twig_comments => {
                    let body = comment.data.trim();
                    let twig = if body.contains('\n') {
                        let lines: Vec<&str> = body.lines().map(str::trim).collect();
                        self.builder.create_multiline_comment(&lines)
                    } else {
                        self.builder.create_comment(body)
                    };
                    edits.child_replacements.push((child, twig));
                }
                _ => {}
            }
        }
    }
}

/// Finds the single element inside the template container.
///
/// Text and comments around it are ignored.
pub fn root_element(document: &Document, template: NodeId) -> CompileResult<NodeId> {
    let candidates: Vec<NodeId> = document
        .children(template)
        .iter()
        .copied()
        .filter(|&child| {
            !matches!(
                document.kind(child),
                NodeKind::Text(_) | NodeKind::Comment(_)
            )
        })
        .collect();

    match candidates.as_slice() {
        [root] => Ok(*root),
        _ => Err(CompileError::Structural {
            found: candidates.len(),
            span: document.span(template),
        }),
    }
}

/// Reads the expression of a conditional directive, which must not be empty.
fn required_condition<'a>(
    element: &'a vue_markup::Element,
    directive: &'static str,
    span: vue_markup::Span,
) -> CompileResult<&'a str> {
    match element.attributes.get(directive) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        value => Err(CompileError::MalformedDirective {
            tag: element.name.clone(),
            attribute: directive.into(),
            value: value.unwrap_or("").to_string(),
            reason: "empty condition",
            span,
        }),
    }
}

fn merge_static(name: &str, existing: Option<&str>, bound: String) -> String {
    match existing.map(str::trim).filter(|s| !s.is_empty()) {
        Some(existing) if name == "style" => {
            format!("{}; {}", existing.trim_end_matches(';'), bound)
        }
        Some(existing) => format!("{existing} {bound}"),
        None => bound,
    }
}

fn is_blank(document: &Document, node: NodeId) -> bool {
    match document.kind(node) {
        NodeKind::Text(text) => text.data.trim().is_empty(),
        NodeKind::Comment(_) => true,
        _ => false,
    }
}

/// Collects the context passed to an included component.
fn component_properties(builder: &TwigBuilder, document: &Document, node: NodeId) -> Vec<Property> {
    let Some(element) = document.element(node) else {
        return Vec::new();
    };

    let mut properties: Vec<Property> = Vec::new();
    for (attribute, value) in element.attributes.iter() {
        if let Some(name) = binding_name(attribute) {
            if name.is_empty() {
                continue;
            }
            let expression = rewrite_condition(value.unwrap_or("").trim());
            match properties.iter_mut().find(|p| p.name == name) {
                Some(existing) if name == "class" => {
                    // Static class first, then the bound one.
                    let literal = existing.value.trim_matches('"');
                    existing.value = format!(
                        "\"{} {}\"",
                        literal,
                        builder.create_interpolation(&expression)
                    );
                }
                Some(existing) => existing.value = expression,
                None => properties.push(Property::new(name, expression)),
            }
            continue;
        }
        if attribute.starts_with("v-") || is_event_handler(attribute) {
            debug!(attribute, "skip directive on component");
            continue;
        }

        let value = match value {
            Some(value) => format!("\"{}\"", value.replace('"', "\\\"")),
            None => "true".to_string(),
        };
        match properties.iter_mut().find(|p| p.name == attribute) {
            Some(existing) if attribute == "class" => {
                existing.value = format!(
                    "\"{} {}\"",
                    value.trim_matches('"'),
                    builder.create_interpolation(&existing.value)
                );
            }
            Some(_) => {}
            None => properties.push(Property::new(attribute, value)),
        }
    }
    properties
}
