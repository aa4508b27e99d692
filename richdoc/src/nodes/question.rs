use crate::document::{Element, NodeType};
use crate::dom::DomSpec;
use crate::markup::{MarkupNode, MarkupWriter, TokenKind};
use crate::schema::{BLOCK_GROUP, ContentExpr, DomParseRule, NodeSpec};

/// Question block: one or more paragraphs, written as a block quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct Question;

impl MarkupNode for Question {
    fn node_type(&self) -> NodeType {
        NodeType::Question
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            group: Some(BLOCK_GROUP),
            defining: true,
            parse_dom: vec![DomParseRule::tag("div")],
            ..NodeSpec::new(ContentExpr::OneOrMore(NodeType::Paragraph))
        }
    }

    fn to_dom(&self, _element: &Element) -> DomSpec {
        DomSpec::element("div")
            .attr("class", "question-container")
            .child(
                DomSpec::element("aside")
                    .attr("class", "margin-note")
                    .child(DomSpec::Text("Question".to_string())),
            )
            .child(
                DomSpec::element("span")
                    .attr("class", "question")
                    .child(DomSpec::Hole),
            )
    }

    fn to_markup(&self, writer: &mut MarkupWriter<'_>, element: &Element) {
        writer.wrap_block("> ", None, NodeType::Question, |w| w.render_content(element));
    }

    fn parse_token(&self) -> Option<TokenKind> {
        Some(TokenKind::Blockquote)
    }
}
