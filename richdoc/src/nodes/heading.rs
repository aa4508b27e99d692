use crate::document::{AttrValue, Attrs, Element, NodeType};
use crate::dom::DomSpec;
use crate::markup::{MarkupNode, MarkupToken, MarkupWriter, ParseError, TokenKind};
use crate::schema::{AttrSpec, BLOCK_GROUP, ContentExpr, DomParseRule, NodeSpec};

/// Class carried by the anchor element placed in front of every heading.
pub const ANCHOR_CLASS: &str = "heading-name";

/// Heading levels enabled when none are configured.
pub const DEFAULT_LEVELS: [u8; 4] = [1, 2, 3, 4];

/// Section heading. Attributes: `level` (default 1) and `collapsed` (undefined
/// until the user folds it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Levels that may be created, parsed and bound to shortcuts.
    pub levels: Vec<u8>,
    /// Added to the level of the rendered `h` tag.
    pub offset: u8,
}

impl Default for Heading {
    fn default() -> Self {
        Heading {
            levels: DEFAULT_LEVELS.to_vec(),
            offset: 0,
        }
    }
}

impl Heading {
    pub fn new(levels: Vec<u8>, offset: u8) -> Self {
        Heading { levels, offset }
    }

    pub fn level(element: &Element) -> u8 {
        element
            .attrs
            .get_int("level")
            .and_then(|n| u8::try_from(n).ok())
            .unwrap_or(1)
    }

    pub fn is_collapsed(element: &Element) -> bool {
        element.attrs.get_bool("collapsed").unwrap_or(false)
    }

    pub fn attrs(level: u8) -> Attrs {
        Attrs::new().with("level", level)
    }
}

impl MarkupNode for Heading {
    fn node_type(&self) -> NodeType {
        NodeType::Heading
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            group: Some(BLOCK_GROUP),
            defining: true,
            draggable: false,
            attrs: vec![
                AttrSpec {
                    name: "level",
                    default: Some(AttrValue::Int(1)),
                },
                AttrSpec {
                    name: "collapsed",
                    default: None,
                },
            ],
            parse_dom: self
                .levels
                .iter()
                .map(|&level| DomParseRule {
                    tag: format!("h{}", level),
                    attrs: Heading::attrs(level),
                    content_element: Some("span"),
                })
                .collect(),
            ..NodeSpec::new(ContentExpr::Inline)
        }
    }

    fn to_dom(&self, element: &Element) -> DomSpec {
        let collapsed = if Heading::is_collapsed(element) {
            "collapsed"
        } else {
            ""
        };
        let anchor = DomSpec::element("button")
            .attr("type", "button")
            .attr("class", "heading-anchor")
            .attr("contenteditable", "false")
            .child(DomSpec::Text("#".to_string()));
        let fold = DomSpec::element("button")
            .attr("type", "button")
            .attr("class", format!("heading-fold {}", collapsed).trim_end())
            .attr("contenteditable", "false");

        DomSpec::element(format!("h{}", Heading::level(element) + self.offset))
            .child(
                DomSpec::element("span")
                    .attr("class", format!("heading-actions {}", collapsed).trim_end())
                    .child(anchor)
                    .child(fold),
            )
            .child(
                DomSpec::element("span")
                    .attr("class", "heading-content")
                    .child(DomSpec::Hole),
            )
    }

    fn to_markup(&self, writer: &mut MarkupWriter<'_>, element: &Element) {
        writer.write(&format!("{} ", "#".repeat(Heading::level(element) as usize)));
        let mut text: String = element.inlines().iter().map(|n| n.to_string()).collect();
        // A trailing run of `#` would be read as a closing sequence.
        if text.ends_with('#') {
            text.insert(text.len() - 1, '\\');
        }
        writer.text(&text);
        writer.close_block(NodeType::Heading);
    }

    fn parse_token(&self) -> Option<TokenKind> {
        Some(TokenKind::Heading)
    }

    fn from_markup(&self, token: &MarkupToken) -> Result<Attrs, ParseError> {
        let level = token
            .tag
            .strip_prefix('h')
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(|| {
                ParseError::error(
                    format!("heading tag `{}` carries no numeric level", token.tag),
                    token.span.clone(),
                    token.file_id,
                )
            })?;

        if !self.levels.contains(&level) {
            let enabled: Vec<String> = self.levels.iter().map(u8::to_string).collect();
            return Err(ParseError::error(
                format!("heading level {} is not enabled", level),
                token.span.clone(),
                token.file_id,
            )
            .with_note(format!("enabled levels: {}", enabled.join(", "))));
        }

        Ok(Heading::attrs(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(tag: &str) -> MarkupToken {
        MarkupToken {
            kind: TokenKind::Heading,
            tag: tag.to_string(),
            marker: None,
            span: 0..4,
            file_id: 0,
        }
    }

    #[test]
    fn level_comes_from_tag_depth() {
        let heading = Heading::default();
        for level in 1..=4u8 {
            let attrs = heading.from_markup(&token(&format!("h{}", level))).unwrap();
            assert_eq!(attrs, Heading::attrs(level));
        }
    }

    #[test]
    fn rejects_non_numeric_and_disabled_levels() {
        let heading = Heading::default();
        assert!(heading.from_markup(&token("hx")).is_err());
        let err = heading.from_markup(&token("h5")).unwrap_err();
        assert!(err.message.contains("level 5"));
    }

    #[test]
    fn dom_carries_fold_state_and_offset() {
        let heading = Heading::new(vec![1, 2], 1);
        let element = Element::textblock(
            NodeType::Heading,
            Heading::attrs(1).with("collapsed", true),
            "Title",
        );
        let DomSpec::Element { tag, children, .. } = heading.to_dom(&element) else {
            panic!("expected element");
        };
        assert_eq!(tag, "h2");
        let DomSpec::Element { attrs, .. } = &children[0] else {
            panic!("expected actions span");
        };
        assert_eq!(attrs[0].1, "heading-actions collapsed");
    }
}
