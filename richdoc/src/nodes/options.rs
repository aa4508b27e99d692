use crate::document::{Attrs, Element, NodeType};
use crate::dom::DomSpec;
use crate::markup::{MarkupNode, MarkupToken, MarkupWriter, ParseError, TokenKind};
use crate::schema::{AttrSpec, BLOCK_GROUP, ContentExpr, DomParseRule, NodeSpec};

/// Marker written when the list carries no `bullet` attribute.
pub const DEFAULT_BULLET: char = '*';

/// Single-level option list. The optional `bullet` attribute keeps a
/// non-default marker (`-` or `+`) across a round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options;

impl Options {
    pub fn bullet(element: &Element) -> char {
        element
            .attrs
            .get_str("bullet")
            .and_then(|s| s.chars().next())
            .unwrap_or(DEFAULT_BULLET)
    }
}

impl MarkupNode for Options {
    fn node_type(&self) -> NodeType {
        NodeType::Options
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            group: Some(BLOCK_GROUP),
            attrs: vec![AttrSpec {
                name: "bullet",
                default: None,
            }],
            parse_dom: vec![DomParseRule::tag("ul")],
            ..NodeSpec::new(ContentExpr::OneOrMore(NodeType::ListItem))
        }
    }

    fn to_dom(&self, _element: &Element) -> DomSpec {
        DomSpec::element("ul").child(DomSpec::Hole)
    }

    fn to_markup(&self, writer: &mut MarkupWriter<'_>, element: &Element) {
        let bullet = Options::bullet(element);
        writer.render_list(element, "  ", |_| format!("{} ", bullet));
    }

    fn parse_token(&self) -> Option<TokenKind> {
        Some(TokenKind::BulletList)
    }

    fn from_markup(&self, token: &MarkupToken) -> Result<Attrs, ParseError> {
        match token.marker {
            None | Some(DEFAULT_BULLET) => Ok(Attrs::new()),
            Some(marker @ ('-' | '+')) => Ok(Attrs::new().with("bullet", marker.to_string())),
            Some(other) => Err(ParseError::error(
                format!("`{}` is not a bullet marker", other),
                token.span.clone(),
                token.file_id,
            )),
        }
    }
}
