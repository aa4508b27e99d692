pub mod error;
mod parser;
pub mod writer;

use std::ops::Range;

pub use error::{ParseError, ParseErrorKind};
pub use writer::MarkupWriter;

use crate::document::{Attrs, Document, Element, NodeType};
use crate::dom::DomSpec;
use crate::schema::{NodeSpec, Schema};

/// Block-level constructs of the markup dialect a node can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Paragraph,
    Heading,
    BulletList,
    ListItem,
    Blockquote,
}

/// A parsed block-level markup construct, handed to the node that claims it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupToken {
    pub kind: TokenKind,
    /// HTML-style tag of the construct: `h2`, `ul`, `li`, `blockquote`, `p`.
    pub tag: String,
    /// List marker character, for bullet lists.
    pub marker: Option<char>,
    pub span: Range<usize>,
    pub file_id: usize,
}

/// The schema and markup half of a node descriptor.
pub trait MarkupNode: Send + Sync {
    fn node_type(&self) -> NodeType;

    fn spec(&self) -> NodeSpec;

    fn to_dom(&self, element: &Element) -> DomSpec;

    /// Serialize `element` into the writer.
    fn to_markup(&self, writer: &mut MarkupWriter<'_>, element: &Element);

    /// The markup token this node is parsed from, if any.
    fn parse_token(&self) -> Option<TokenKind>;

    /// Attributes for an element parsed from `token`. Rejects tokens of the wrong shape.
    fn from_markup(&self, _token: &MarkupToken) -> Result<Attrs, ParseError> {
        Ok(Attrs::new())
    }
}

/// Parser entry point.
pub struct Parser<'s> {
    source: String,
    file_id: usize,
    schema: &'s Schema,
}

impl<'s> Parser<'s> {
    pub fn new(source: String, file_id: usize, schema: &'s Schema) -> Self {
        Parser {
            source,
            file_id,
            schema,
        }
    }

    /// Parse the source markup into a document, collecting every error.
    pub fn parse(&self) -> Result<Document, Vec<ParseError>> {
        let content = parser::parse_elements(&self.source, self.file_id, self.schema)?;
        Ok(Document { content })
    }
}

/// Serialize a whole document.
pub fn serialize(doc: &Document, schema: &Schema) -> String {
    let mut writer = MarkupWriter::new(schema);
    for element in &doc.content {
        writer.render(element);
    }
    writer.finish()
}

/// Serialize a single element as if it were a document of its own.
pub fn serialize_element(element: &Element, schema: &Schema) -> String {
    let mut writer = MarkupWriter::new(schema);
    writer.render(element);
    writer.finish()
}
