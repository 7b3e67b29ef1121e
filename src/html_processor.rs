/*!
 * HTML document model.
 *
 * Wraps an `html5ever` parse tree (`markup5ever_rcdom`) and exposes only what the
 * translation pipeline needs: the element nodes of the `<body>`, each node's own
 * text run, and serialization back to markup.
 *
 * Parsing is lenient, like a browser: unclosed and misnested tags still produce
 * a tree. The only content rejected outright is content that is not UTF-8 text.
 */

use std::fmt;
use std::io;

use html5ever::parse_document;
use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::errors::MarkupError;

/// Classification of an element by what its content is.
///
/// Everything except `Content` holds code, styling, or inert markup that must
/// never be handed to a translation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<script>`
    Script,
    /// `<style>`
    Style,
    /// `<template>`
    Template,
    /// `<noscript>`, parsed as raw markup text when scripting is enabled
    NoScript,
    /// `<code>`, `<kbd>`, `<samp>`, `<var>`
    Code,
    /// Any element whose text is meant for humans
    Content,
}

impl ElementKind {
    /// Classify a (lower-case) tag name
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "script" => Self::Script,
            "style" => Self::Style,
            "template" => Self::Template,
            "noscript" => Self::NoScript,
            "code" | "kbd" | "samp" | "var" => Self::Code,
            _ => Self::Content,
        }
    }

    /// Whether text directly inside this kind of element may be translated
    pub fn is_translatable(self) -> bool {
        matches!(self, Self::Content)
    }
}

/// An element inside the primary content region of a document
#[derive(Clone)]
pub struct ElementNode {
    handle: Handle,
    tag: String,
    kind: ElementKind,
    /// Set when some ancestor is not translatable
    inside_opaque: bool,
}

impl fmt::Debug for ElementNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementNode")
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("inside_opaque", &self.inside_opaque)
            .finish()
    }
}

impl ElementNode {
    /// Tag name of the element
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Kind of the element itself
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// True when neither the element nor any of its ancestors holds code
    pub fn is_translatable(&self) -> bool {
        self.kind.is_translatable() && !self.inside_opaque
    }

    /// Direct text children carrying something other than whitespace
    fn text_runs(&self) -> Vec<Handle> {
        self.handle
            .children
            .borrow()
            .iter()
            .filter(|child| match &child.data {
                NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
                _ => false,
            })
            .cloned()
            .collect()
    }

    /// The element's own text, never its descendants' text.
    ///
    /// Returns `None` when the element has no non-blank text child, or when its
    /// text is split into several runs around child elements (mixed content),
    /// since a single replacement string cannot be mapped back onto those runs.
    pub fn direct_text(&self) -> Option<String> {
        match self.text_runs().as_slice() {
            [run] => match &run.data {
                NodeData::Text { contents } => Some(contents.borrow().to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Replace the element's own text, leaving tag, attributes and children alone
    pub fn set_direct_text(&self, text: &str) -> Result<(), MarkupError> {
        match self.text_runs().as_slice() {
            [run] => match &run.data {
                NodeData::Text { contents } => {
                    *contents.borrow_mut() = StrTendril::from_slice(text);
                    Ok(())
                }
                _ => Err(MarkupError::NoDirectText(self.tag.clone())),
            },
            _ => Err(MarkupError::NoDirectText(self.tag.clone())),
        }
    }
}

/// Children that make up the markup of a node.
///
/// The parser keeps the content of `<template>` in a separate fragment rather
/// than in `children`, so it has to be picked up from there.
fn markup_children(node: &Handle) -> Vec<Handle> {
    if let NodeData::Element { ref template_contents, .. } = node.data {
        if let Some(fragment) = template_contents.borrow().as_ref() {
            return fragment.children.borrow().clone();
        }
    }
    node.children.borrow().clone()
}

enum SerializeOp {
    Open(Handle),
    Close(QualName),
}

/// Tree walk handed to the html5ever serializer
struct MarkupTree(Handle);

impl Serialize for MarkupTree {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops: Vec<SerializeOp> = match traversal_scope {
            TraversalScope::IncludeNode => vec![SerializeOp::Open(self.0.clone())],
            TraversalScope::ChildrenOnly(_) => markup_children(&self.0)
                .into_iter()
                .rev()
                .map(SerializeOp::Open)
                .collect(),
        };

        while let Some(op) = ops.pop() {
            match op {
                SerializeOp::Open(handle) => match handle.data {
                    NodeData::Element { ref name, ref attrs, .. } => {
                        serializer.start_elem(
                            name.clone(),
                            attrs.borrow().iter().map(|attr| (&attr.name, &attr.value[..])),
                        )?;
                        ops.push(SerializeOp::Close(name.clone()));
                        ops.extend(markup_children(&handle).into_iter().rev().map(SerializeOp::Open));
                    }
                    NodeData::Doctype { ref name, .. } => serializer.write_doctype(name)?,
                    NodeData::Text { ref contents } => serializer.write_text(&contents.borrow())?,
                    NodeData::Comment { ref contents } => serializer.write_comment(contents)?,
                    NodeData::ProcessingInstruction { ref target, ref contents } => {
                        serializer.write_processing_instruction(target, contents)?
                    }
                    NodeData::Document => {
                        ops.extend(markup_children(&handle).into_iter().rev().map(SerializeOp::Open));
                    }
                },
                SerializeOp::Close(name) => serializer.end_elem(name)?,
            }
        }

        Ok(())
    }
}

/// A parsed HTML document, owned by the task processing it
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parse raw document bytes.
    ///
    /// # Errors
    /// `MarkupError::Parse` when the bytes are not valid UTF-8.
    pub fn parse(content: &[u8]) -> Result<Self, MarkupError> {
        let text = std::str::from_utf8(content)
            .map_err(|e| MarkupError::Parse(format!("content is not valid UTF-8: {}", e)))?;
        Ok(Self::parse_str(text))
    }

    /// Parse markup text. Never fails: malformed markup yields a best-effort tree.
    pub fn parse_str(content: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(content);
        Self { dom }
    }

    /// The `<body>` element, if the document has one
    fn body(&self) -> Option<Handle> {
        let mut stack = vec![self.dom.document.clone()];
        while let Some(node) = stack.pop() {
            if let NodeData::Element { ref name, .. } = node.data {
                if &*name.local == "body" {
                    return Some(node);
                }
            }
            stack.extend(node.children.borrow().iter().rev().cloned());
        }
        None
    }

    /// All elements inside `<body>`, at every depth, in document order
    pub fn primary_content_nodes(&self) -> Vec<ElementNode> {
        let Some(body) = self.body() else {
            return Vec::new();
        };

        let mut nodes = Vec::new();
        let mut stack: Vec<(Handle, bool)> = body
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), false))
            .collect();

        while let Some((node, inside_opaque)) = stack.pop() {
            let NodeData::Element { ref name, .. } = node.data else {
                continue;
            };

            let tag = name.local.to_string();
            let kind = ElementKind::from_tag(&tag);
            let children_opaque = inside_opaque || !kind.is_translatable();

            stack.extend(
                node.children
                    .borrow()
                    .iter()
                    .rev()
                    .map(|child| (child.clone(), children_opaque)),
            );

            nodes.push(ElementNode {
                handle: node.clone(),
                tag,
                kind,
                inside_opaque,
            });
        }

        nodes
    }

    /// Render the tree back to markup, template content included
    pub fn serialize(&self) -> Result<String, MarkupError> {
        let mut buf: Vec<u8> = Vec::new();
        let document = MarkupTree(self.dom.document.clone());

        serialize(&mut buf, &document, SerializeOpts::default())
            .map_err(|e| MarkupError::Serialize(e.to_string()))?;

        String::from_utf8(buf).map_err(|e| MarkupError::Serialize(e.to_string()))
    }
}
