//! Schema and markup halves of the built-in node descriptors.

mod heading;
mod list_item;
mod options;
mod paragraph;
mod question;

pub use heading::{ANCHOR_CLASS, DEFAULT_LEVELS, Heading};
pub use list_item::ListItem;
pub use options::{DEFAULT_BULLET, Options};
pub use paragraph::Paragraph;
pub use question::Question;
