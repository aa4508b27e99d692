use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::document::inline::normalize_inlines;
use crate::document::{Content, Element, InlineNode};
use crate::markup::error::ParseError;
use crate::markup::writer::LIST_SEPARATOR;
use crate::markup::{MarkupToken, TokenKind};
use crate::schema::Schema;

type Events<'e> = [(Event<'e>, Range<usize>)];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse markup source text into top-level elements.
pub fn parse_elements(
    source: &str,
    file_id: usize,
    schema: &Schema,
) -> Result<Vec<Element>, Vec<ParseError>> {
    let options = Options::ENABLE_STRIKETHROUGH;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut state = ParseState::new(source, file_id, schema);
    let mut i = 0;
    let elements = state.collect_blocks(&events, &mut i, &|_| false);
    state.finalize(elements)
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source: &'a str,
    file_id: usize,
    schema: &'a Schema,
    errors: Vec<ParseError>,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, file_id: usize, schema: &'a Schema) -> Self {
        ParseState {
            source,
            file_id,
            schema,
            errors: Vec::new(),
        }
    }

    fn token(&self, kind: TokenKind, tag: impl Into<String>, span: &Range<usize>) -> MarkupToken {
        MarkupToken {
            kind,
            tag: tag.into(),
            marker: None,
            span: span.clone(),
            file_id: self.file_id,
        }
    }

    /// Collect block elements until the matching End tag.
    fn collect_blocks(
        &mut self,
        events: &Events<'_>,
        i: &mut usize,
        is_end: &dyn Fn(&TagEnd) -> bool,
    ) -> Vec<Element> {
        let mut blocks = Vec::new();

        while *i < events.len() {
            let (ref ev, ref range) = events[*i];

            match ev {
                Event::End(tag_end) if is_end(tag_end) => {
                    *i += 1;
                    break;
                }

                Event::Start(Tag::Heading { level, .. }) => {
                    let token = self.token(
                        TokenKind::Heading,
                        format!("h{}", heading_level_to_u8(level)),
                        range,
                    );
                    *i += 1;
                    let inlines = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Heading(_)));
                    blocks.extend(self.build(token, Content::Inline(inlines)));
                }

                Event::Start(Tag::Paragraph) => {
                    let token = self.token(TokenKind::Paragraph, "p", range);
                    *i += 1;
                    let inlines = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Paragraph));
                    blocks.extend(self.build(token, Content::Inline(inlines)));
                }

                // Unordered list = option list
                Event::Start(Tag::List(None)) => {
                    let mut token = self.token(TokenKind::BulletList, "ul", range);
                    token.marker = extract_bullet_marker(self.source, range.start);
                    *i += 1;
                    let items = self.collect_list_items(events, i);
                    blocks.extend(self.build(token, Content::Blocks(items)));
                }

                Event::Start(Tag::List(Some(_))) => {
                    self.errors.push(
                        ParseError::unsupported("ordered list", range.clone(), self.file_id)
                            .with_note("use `*` bullets for an option list"),
                    );
                    skip_element(events, i);
                }

                // Blockquote = question
                Event::Start(Tag::BlockQuote(_)) => {
                    let token = self.token(TokenKind::Blockquote, "blockquote", range);
                    *i += 1;
                    let mut inner = self.collect_blocks(events, i, &|e| matches!(e, TagEnd::BlockQuote(_)));
                    if inner.is_empty() {
                        inner.extend(self.empty_paragraph(range));
                    }
                    blocks.extend(self.build(token, Content::Blocks(inner)));
                }

                Event::Start(Tag::HtmlBlock) if is_list_separator(events, *i) => {
                    skip_element(events, i);
                }

                Event::Start(tag) => {
                    self.unsupported(describe_tag(tag), range);
                    skip_element(events, i);
                }

                Event::Rule => {
                    self.unsupported("horizontal rule", range);
                    *i += 1;
                }

                Event::Html(_) | Event::InlineHtml(_) => {
                    self.unsupported("raw HTML", range);
                    *i += 1;
                }

                _ => {
                    *i += 1;
                }
            }
        }

        blocks
    }

    fn unsupported(&mut self, what: &str, range: &Range<usize>) {
        self.errors
            .push(ParseError::unsupported(what, range.clone(), self.file_id));
    }

    /// Collect list items until End(List). Items may only hold paragraphs.
    fn collect_list_items(&mut self, events: &Events<'_>, i: &mut usize) -> Vec<Element> {
        let mut items = Vec::new();

        while *i < events.len() {
            let (ref ev, ref range) = events[*i];
            match ev {
                Event::End(TagEnd::List(_)) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::Item) => {
                    let token = self.token(TokenKind::ListItem, "li", range);
                    *i += 1;
                    let paragraphs = self.collect_item_paragraphs(events, i, range);
                    items.extend(self.build(token, Content::Blocks(paragraphs)));
                }
                _ => {
                    *i += 1;
                }
            }
        }

        items
    }

    /// Collect the paragraphs of a single list item until End(Item).
    /// Tight items carry their inline events without a Paragraph wrapper.
    fn collect_item_paragraphs(
        &mut self,
        events: &Events<'_>,
        i: &mut usize,
        item_range: &Range<usize>,
    ) -> Vec<Element> {
        let mut paragraphs = Vec::new();
        let mut loose = Vec::new();

        while *i < events.len() {
            let (ref ev, ref range) = events[*i];
            match ev {
                Event::End(TagEnd::Item) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::Paragraph) => {
                    self.flush_loose(&mut loose, &mut paragraphs, item_range);
                    let token = self.token(TokenKind::Paragraph, "p", range);
                    *i += 1;
                    let inlines = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Paragraph));
                    paragraphs.extend(self.build(token, Content::Inline(inlines)));
                }
                Event::Start(Tag::List(_)) => {
                    self.errors.push(
                        ParseError::error("option lists cannot be nested", range.clone(), self.file_id)
                            .with_context(item_range.clone(), "inside this option")
                            .with_note("option lists have a single level"),
                    );
                    skip_element(events, i);
                }
                Event::Start(tag) if is_block_tag(tag) => {
                    self.errors.push(ParseError::error(
                        format!("list items may only contain paragraphs, found {}", describe_tag(tag)),
                        range.clone(),
                        self.file_id,
                    )
                    .with_context(item_range.clone(), "inside this option"));
                    skip_element(events, i);
                }
                _ => {
                    if let Some(inline) = self.inline_event(events, i) {
                        loose.push(inline);
                    }
                }
            }
        }

        self.flush_loose(&mut loose, &mut paragraphs, item_range);
        if paragraphs.is_empty() {
            paragraphs.extend(self.empty_paragraph(item_range));
        }
        paragraphs
    }

    /// The paragraph standing in for an empty question or option.
    fn empty_paragraph(&mut self, range: &Range<usize>) -> Option<Element> {
        let token = self.token(TokenKind::Paragraph, "p", range);
        self.build(token, Content::Inline(Vec::new()))
    }

    fn flush_loose(
        &mut self,
        loose: &mut Vec<InlineNode>,
        paragraphs: &mut Vec<Element>,
        range: &Range<usize>,
    ) {
        if loose.is_empty() {
            return;
        }
        let token = self.token(TokenKind::Paragraph, "p", range);
        let inlines = normalize_inlines(std::mem::take(loose));
        paragraphs.extend(self.build(token, Content::Inline(inlines)));
    }

    /// Hand `token` to the node that claims it and validate the resulting element.
    fn build(&mut self, token: MarkupToken, content: Content) -> Option<Element> {
        let schema = self.schema;
        let Some(node) = schema.node_for_token(token.kind) else {
            self.errors.push(ParseError::error(
                format!("no node type handles `{}`", token.tag),
                token.span.clone(),
                self.file_id,
            ));
            return None;
        };

        let attrs = match node.from_markup(&token) {
            Ok(attrs) => attrs,
            Err(err) => {
                self.errors.push(err);
                return None;
            }
        };

        let element = Element::new(
            node.node_type(),
            node.spec().default_attrs().merged(&attrs),
            content,
        );
        if let Err(err) = schema.check_element(&element, token.span.start) {
            self.errors.push(ParseError::error(
                err.to_string(),
                token.span.clone(),
                self.file_id,
            ));
            return None;
        }
        Some(element)
    }

    /// Collect inline nodes until a matching End tag.
    fn collect_inlines(
        &self,
        events: &Events<'_>,
        i: &mut usize,
        is_end: &dyn Fn(&TagEnd) -> bool,
    ) -> Vec<InlineNode> {
        let mut inlines = Vec::new();

        while *i < events.len() {
            let (ref ev, _) = events[*i];
            match ev {
                Event::End(tag_end) if is_end(tag_end) => {
                    *i += 1;
                    break;
                }
                _ => {
                    if let Some(inline) = self.inline_event(events, i) {
                        inlines.push(inline);
                    }
                }
            }
        }

        normalize_inlines(inlines)
    }

    /// Consume one inline construct starting at `events[*i]`.
    fn inline_event(&self, events: &Events<'_>, i: &mut usize) -> Option<InlineNode> {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::Text(s) => Some(InlineNode::Text(s.to_string())),
            Event::Code(s) => Some(InlineNode::CodeSpan(s.to_string())),
            Event::SoftBreak => Some(InlineNode::SoftBreak),
            Event::HardBreak => Some(InlineNode::HardBreak),
            Event::Start(Tag::Strong) => Some(InlineNode::Strong(
                self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Strong)),
            )),
            Event::Start(Tag::Emphasis) => Some(InlineNode::Emphasis(
                self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Emphasis)),
            )),
            Event::Start(Tag::Strikethrough) => Some(InlineNode::Strikethrough(
                self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Strikethrough)),
            )),
            Event::Start(Tag::Link { dest_url, title, .. }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                let content = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Link));
                Some(InlineNode::Link { dest, title, content })
            }
            Event::Start(Tag::Image { dest_url, title, .. }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                let alt = self.collect_inlines(events, i, &|e| matches!(e, TagEnd::Image));
                Some(InlineNode::Image { dest, title, alt })
            }
            _ => None,
        }
    }

    fn finalize(self, elements: Vec<Element>) -> Result<Vec<Element>, Vec<ParseError>> {
        if self.errors.is_empty() {
            Ok(elements)
        } else {
            Err(self.errors)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    !matches!(
        tag,
        Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Link { .. }
            | Tag::Image { .. }
    )
}

fn describe_tag(tag: &Tag<'_>) -> &'static str {
    match tag {
        Tag::CodeBlock(_) => "code block",
        Tag::Table(_) | Tag::TableHead | Tag::TableRow | Tag::TableCell => "table",
        Tag::HtmlBlock => "raw HTML",
        Tag::List(Some(_)) => "ordered list",
        Tag::List(None) => "bullet list",
        Tag::Heading { .. } => "heading",
        Tag::BlockQuote(_) => "block quote",
        Tag::FootnoteDefinition(_) => "footnote definition",
        _ => "block construct",
    }
}

/// Whether the HTML block starting at `events[start]` is only the empty
/// comment written between adjacent lists.
fn is_list_separator(events: &Events<'_>, start: usize) -> bool {
    let mut html = String::new();
    for (ev, _) in &events[start + 1..] {
        match ev {
            Event::Html(text) => html.push_str(text),
            Event::End(TagEnd::HtmlBlock) => break,
            _ => return false,
        }
    }
    html.trim() == LIST_SEPARATOR
}

/// Skip the element starting at `events[*i]`, including everything nested in it.
fn skip_element(events: &Events<'_>, i: &mut usize) {
    let mut depth = 0u32;
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            _ if depth == 0 => break,
            _ => {}
        }
    }
}

/// Extract the bullet character of a list from source text.
/// pulldown-cmark does not report the marker, so we look at the raw source.
///
/// The List event range starts at the first item's marker, possibly after
/// indentation or a block quote prefix.
fn extract_bullet_marker(source: &str, list_start: usize) -> Option<char> {
    let rest = source.get(list_start..)?;
    let line_end = rest.find('\n').unwrap_or(rest.len());
    rest[..line_end]
        .chars()
        .find(|c| !c.is_whitespace() && *c != '>')
        .filter(|c| matches!(c, '*' | '-' | '+'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_marker_from_source() {
        assert_eq!(extract_bullet_marker("- a\n- b", 0), Some('-'));
        assert_eq!(extract_bullet_marker("x\n\n  + a", 3), Some('+'));
        assert_eq!(extract_bullet_marker("1. a", 0), None);
    }
}
