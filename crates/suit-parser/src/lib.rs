//! Template markup parser for Suit.
//!
//! This crate turns template text into a tree of typed tags:
//! - Lexer for reserved tag edges using `logos`
//! - Count/decount passes that pair nested tags of the same name
//! - Opening portion, attribute and body parsing
//! - Loop body rewriting for `<list>` bindings
//! - Tag tree types
//!
//! # Example
//!
//! ```
//! use suit_parser::{parse, TagKind};
//!
//! let part = parse("Hello, <var d='stranger'>user.name</var>!").unwrap();
//! assert_eq!(part.placeholder_text(), "Hello, {{ph:0}}!");
//! assert!(matches!(part.children()[0].kind, TagKind::Var(_)));
//! ```

mod ast;
mod counter;
mod error;
mod lexer;
mod markup;
mod parser;
mod path;
mod rewrite;

pub use ast::*;
pub use counter::{count, decount, elements, extract, Element};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{is_reserved, Lexer, Token, TokenKind, RESERVED_TAGS};
pub use markup::{normalize_whitespace, opening_len, quote_attribute, Attributes, Markup};
pub use path::{parse_path, render_path, PathSegment};
pub use rewrite::{rewrite_list_body, LoopBinding};
pub use suit_span::Span;

/// Parses top-level template text into a [`TemplatePart`].
pub fn parse(text: &str) -> Result<TemplatePart, ParseError> {
    TemplatePart::parse(text)
}
