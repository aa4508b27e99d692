use richdoc::{DocumentError, ParseError};

/// A transaction step that could not be applied. The transaction is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("position {0} is outside the document")]
    OutOfRange(usize),
    #[error("no element starts at position {0}")]
    NoElementAt(usize),
    #[error("position {0} is not inside a textblock")]
    NotInTextblock(usize),
    #[error("range {from}..{to} spans more than one textblock")]
    SpansBlocks { from: usize, to: usize },
    #[error("cannot split {depth} levels deep at position {pos}")]
    InvalidDepth { pos: usize, depth: usize },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("empty key chord")]
    Empty,
    #[error("unknown modifier `{modifier}` in `{chord}`")]
    UnknownModifier { modifier: String, chord: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store is unavailable")]
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Keymap(#[from] KeymapError),
    #[error("invalid input rule pattern: {0}")]
    Pattern(#[from] regex_lite::Error),
    #[error("no heading anchor at position {0}")]
    NoAnchorAt(usize),
}

impl From<Vec<ParseError>> for EditorError {
    fn from(errors: Vec<ParseError>) -> Self {
        EditorError::Parse(errors)
    }
}
