use crate::document::{Element, NodeType};
use crate::dom::DomSpec;
use crate::markup::{MarkupNode, MarkupWriter, TokenKind};
use crate::schema::{ContentExpr, DomParseRule, NodeSpec};

/// Host-provided list item. Holds paragraphs only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListItem;

impl MarkupNode for ListItem {
    fn node_type(&self) -> NodeType {
        NodeType::ListItem
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            defining: true,
            parse_dom: vec![DomParseRule::tag("li")],
            ..NodeSpec::new(ContentExpr::OneOrMore(NodeType::Paragraph))
        }
    }

    fn to_dom(&self, _element: &Element) -> DomSpec {
        DomSpec::element("li").child(DomSpec::Hole)
    }

    fn to_markup(&self, writer: &mut MarkupWriter<'_>, element: &Element) {
        writer.render_content(element);
    }

    fn parse_token(&self) -> Option<TokenKind> {
        Some(TokenKind::ListItem)
    }
}
