use std::sync::Arc;

use crate::document::{AttrValue, Attrs, Content, Document, DocumentError, Element, NodeType};
use crate::dom::DomSpec;
use crate::markup::{MarkupNode, TokenKind};
use crate::nodes::{Heading, ListItem, Options, Paragraph, Question};

/// The group every top-level block belongs to.
pub const BLOCK_GROUP: &str = "block";

/// What an element's children may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentExpr {
    /// `inline*`
    Inline,
    /// `<kind>+`
    OneOrMore(NodeType),
    /// `block+`: one or more members of the block group.
    Blocks,
}

impl ContentExpr {
    pub fn describe(&self) -> String {
        match self {
            ContentExpr::Inline => "inline*".to_string(),
            ContentExpr::OneOrMore(kind) => format!("{}+", kind),
            ContentExpr::Blocks => format!("{}+", BLOCK_GROUP),
        }
    }
}

/// Attribute definition with its default. `None` leaves the attribute undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub default: Option<AttrValue>,
}

/// Maps an external DOM tag onto a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct DomParseRule {
    pub tag: String,
    pub attrs: Attrs,
    /// Child element that holds the node's content, when not the tag itself.
    pub content_element: Option<&'static str>,
}

impl DomParseRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        DomParseRule {
            tag: tag.into(),
            attrs: Attrs::new(),
            content_element: None,
        }
    }
}

/// Structural rules for one node type.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub content: ContentExpr,
    pub group: Option<&'static str>,
    /// Content boundary: kept when its content is replaced.
    pub defining: bool,
    pub draggable: bool,
    pub attrs: Vec<AttrSpec>,
    pub parse_dom: Vec<DomParseRule>,
}

impl NodeSpec {
    pub fn new(content: ContentExpr) -> Self {
        NodeSpec {
            content,
            group: None,
            defining: false,
            draggable: false,
            attrs: Vec::new(),
            parse_dom: Vec::new(),
        }
    }

    pub fn default_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        for spec in &self.attrs {
            if let Some(default) = &spec.default {
                attrs.set(spec.name, default.clone());
            }
        }
        attrs
    }
}

/// The set of node types a document may contain, and their markup behavior.
#[derive(Clone)]
pub struct Schema {
    nodes: Vec<Arc<dyn MarkupNode>>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|n| n.node_type()))
            .finish()
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { nodes: Vec::new() }
    }

    /// Paragraph, heading, options, list item and question with default options.
    pub fn standard() -> Self {
        Schema::builder()
            .node(Arc::new(Paragraph))
            .node(Arc::new(Heading::default()))
            .node(Arc::new(Options))
            .node(Arc::new(ListItem))
            .node(Arc::new(Question))
            .build()
    }

    pub fn node(&self, kind: NodeType) -> Option<&dyn MarkupNode> {
        self.nodes
            .iter()
            .find(|n| n.node_type() == kind)
            .map(|n| &**n)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &dyn MarkupNode> {
        self.nodes.iter().map(|n| &**n)
    }

    /// First registered node consuming the given markup token.
    pub fn node_for_token(&self, token: TokenKind) -> Option<&dyn MarkupNode> {
        self.nodes
            .iter()
            .find(|n| n.parse_token() == Some(token))
            .map(|n| &**n)
    }

    /// Build an element, filling defaults for attributes the caller left out.
    pub fn create(
        &self,
        kind: NodeType,
        attrs: &Attrs,
        content: Content,
    ) -> Result<Element, DocumentError> {
        let node = self.node(kind).ok_or(DocumentError::UnknownNodeType(kind))?;
        Ok(Element::new(
            kind,
            node.spec().default_attrs().merged(attrs),
            content,
        ))
    }

    /// Whether a child of `kind` may appear in content described by `expr`.
    pub fn allows(&self, expr: ContentExpr, kind: NodeType) -> bool {
        match expr {
            ContentExpr::Inline => false,
            ContentExpr::OneOrMore(allowed) => allowed == kind,
            ContentExpr::Blocks => self
                .node(kind)
                .is_some_and(|n| n.spec().group == Some(BLOCK_GROUP)),
        }
    }

    /// Content rule of the element at `path`; the document root takes `block+`.
    pub fn content_at(&self, doc: &Document, path: &[usize]) -> Option<ContentExpr> {
        if path.is_empty() {
            return Some(ContentExpr::Blocks);
        }
        let element = doc.element(path)?;
        Some(self.node(element.kind)?.spec().content)
    }

    /// Check that `element`'s content satisfies its spec. `pos` is used for reporting.
    pub fn check_element(&self, element: &Element, pos: usize) -> Result<(), DocumentError> {
        let node = self
            .node(element.kind)
            .ok_or(DocumentError::UnknownNodeType(element.kind))?;
        let expr = node.spec().content;
        let valid = match (&element.content, expr) {
            (Content::Inline(_), ContentExpr::Inline) => true,
            (Content::Blocks(children), expr) if expr != ContentExpr::Inline => {
                !children.is_empty() && children.iter().all(|c| self.allows(expr, c.kind))
            }
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(DocumentError::MalformedElement {
                kind: element.kind,
                pos,
                expected: expr.describe(),
            })
        }
    }

    /// Validate every element of the document.
    pub fn check(&self, doc: &Document) -> Result<(), DocumentError> {
        for (i, child) in doc.content.iter().enumerate() {
            if !self.allows(ContentExpr::Blocks, child.kind) {
                return Err(DocumentError::MalformedElement {
                    kind: child.kind,
                    pos: doc.position_of(&[i]).unwrap_or(0),
                    expected: format!("a member of group `{}`", BLOCK_GROUP),
                });
            }
        }
        let mut result = Ok(());
        doc.descendants(|element, pos| {
            if result.is_ok() {
                result = self.check_element(element, pos);
            }
        });
        result
    }

    /// Node type and attributes for an external DOM tag.
    pub fn parse_dom(&self, tag: &str) -> Option<(NodeType, Attrs)> {
        self.nodes.iter().find_map(|n| {
            let spec = n.spec();
            spec.parse_dom
                .iter()
                .find(|rule| rule.tag.eq_ignore_ascii_case(tag))
                .map(|rule| (n.node_type(), spec.default_attrs().merged(&rule.attrs)))
        })
    }

    pub fn to_dom(&self, element: &Element) -> Option<DomSpec> {
        Some(self.node(element.kind)?.to_dom(element))
    }
}

pub struct SchemaBuilder {
    nodes: Vec<Arc<dyn MarkupNode>>,
}

impl SchemaBuilder {
    /// Register a node. A later registration of the same type replaces the earlier one.
    pub fn node(mut self, node: Arc<dyn MarkupNode>) -> Self {
        self.nodes.retain(|n| n.node_type() != node.node_type());
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> Schema {
        Schema { nodes: self.nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_fills_defaults() {
        let schema = Schema::standard();
        let heading = schema
            .create(NodeType::Heading, &Attrs::new(), Content::Inline(Vec::new()))
            .unwrap();
        assert_eq!(heading.attrs.get_int("level"), Some(1));
        assert_eq!(heading.attrs.get_bool("collapsed"), None);
    }

    #[test]
    fn question_rejects_headings() {
        let schema = Schema::standard();
        let question = Element::container(
            NodeType::Question,
            Attrs::new(),
            vec![Element::textblock(NodeType::Heading, Attrs::new().with("level", 1u8), "x")],
        );
        let err = schema.check_element(&question, 0).unwrap_err();
        assert!(err.to_string().contains("paragraph+"));
    }

    #[test]
    fn parse_dom_maps_heading_tags() {
        let schema = Schema::standard();
        let (kind, attrs) = schema.parse_dom("H3").unwrap();
        assert_eq!(kind, NodeType::Heading);
        assert_eq!(attrs.get_int("level"), Some(3));
        assert!(schema.parse_dom("h6").is_none());
        assert_eq!(schema.parse_dom("ul").map(|(k, _)| k), Some(NodeType::Options));
    }
}
