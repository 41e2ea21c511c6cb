//! Parse error types.

use suit_span::Span;
use thiserror::Error;

/// An error that occurred while parsing template markup.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location of the offending tag, relative to the text being parsed.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates an `UnsupportedTag` error for the tag `name`.
    pub fn unsupported(name: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnsupportedTag {
                name: name.into(),
                message: message.into(),
            },
            span,
        )
    }

    /// Returns true for nesting errors (unmatched or mismatched closing tags).
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::UnmatchedClosingTag { .. } | ParseErrorKind::MismatchedClosingTag { .. }
        )
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A closing reserved tag was found while no reserved tag was open.
    #[error("unmatched closing tag: </{name}>")]
    UnmatchedClosingTag {
        /// The name of the closing tag.
        name: String,
    },

    /// A closing reserved tag does not match the innermost open one.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        /// The innermost open tag name.
        expected: String,
        /// The closing tag name that was found.
        found: String,
    },

    /// A reserved tag appears where its grammar forbids it, or lacks a required attribute.
    #[error("unsupported <{name}>: {message}")]
    UnsupportedTag {
        /// The reserved tag name.
        name: String,
        /// A description of the problem.
        message: String,
    },
}
