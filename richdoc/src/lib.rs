pub mod anchors;
pub mod document;
pub mod dom;
pub mod markup;
pub mod nodes;
pub mod schema;
pub mod slug;

pub use anchors::{Anchor, compute_anchors};
pub use document::{AttrValue, Attrs, Content, Document, DocumentError, Element, InlineNode, NodeType};
pub use markup::{MarkupNode, ParseError, Parser, serialize};
pub use schema::Schema;

/// Parse markup with the standard schema.
pub fn parse(source: &str, file_id: usize) -> Result<Document, Vec<ParseError>> {
    let schema = Schema::standard();
    Parser::new(source.to_string(), file_id, &schema).parse()
}
