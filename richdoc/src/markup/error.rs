use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

/// Broad class of a markup error, shown as the diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A construct the document model has no node for.
    Unsupported,
    /// A construct a node claims but whose shape or content it rejects.
    Invalid,
}

impl ParseErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ParseErrorKind::Unsupported => "unsupported",
            ParseErrorKind::Invalid => "invalid",
        }
    }
}

/// A markup error located in a source file.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {}..{}", .span.start, .span.end)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    /// Enclosing construct, shown as a secondary label.
    pub context: Option<(Range<usize>, String)>,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind: ParseErrorKind::Invalid,
            message: message.into(),
            span,
            file_id,
            context: None,
            notes: Vec::new(),
        }
    }

    pub fn unsupported(what: &str, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind: ParseErrorKind::Unsupported,
            ..ParseError::error(format!("unsupported markup: {}", what), span, file_id)
        }
    }

    pub fn with_context(mut self, span: Range<usize>, label: impl Into<String>) -> Self {
        self.context = Some((span, label.into()));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let mut labels = vec![Label::primary(self.file_id, self.span.clone())];
        if let Some((span, label)) = &self.context {
            labels.push(Label::secondary(self.file_id, span.clone()).with_message(label));
        }
        Diagnostic::error()
            .with_code(self.kind.code())
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(self.notes.clone())
    }
}
