use crate::document::{Element, NodeType};
use crate::dom::DomSpec;
use crate::markup::{MarkupNode, MarkupWriter, TokenKind};
use crate::schema::{BLOCK_GROUP, ContentExpr, DomParseRule, NodeSpec};

/// Host-provided plain textblock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paragraph;

impl MarkupNode for Paragraph {
    fn node_type(&self) -> NodeType {
        NodeType::Paragraph
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            group: Some(BLOCK_GROUP),
            parse_dom: vec![DomParseRule::tag("p")],
            ..NodeSpec::new(ContentExpr::Inline)
        }
    }

    fn to_dom(&self, _element: &Element) -> DomSpec {
        DomSpec::element("p").child(DomSpec::Hole)
    }

    fn to_markup(&self, writer: &mut MarkupWriter<'_>, element: &Element) {
        writer.render_inline(element);
        writer.close_block(NodeType::Paragraph);
    }

    fn parse_token(&self) -> Option<TokenKind> {
        Some(TokenKind::Paragraph)
    }
}
