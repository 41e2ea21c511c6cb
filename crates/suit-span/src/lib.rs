//! Byte spans for Suit template sources.
//!
//! Every reserved tag the lexer recognises, and every parse error it reports,
//! carries a [`Span`] into the text that was being scanned. Spans are relative
//! to that text: a nested template part reports offsets into its own body.

mod span;

pub use span::{ByteOffset, Span};
