//! Tag counting: unique ids for reserved tags so nested tags of the same name
//! can be matched with plain text search.
//!
//! `count` rewrites `<var>a</var>` to `<var_0>a</var_0>`, numbering opening
//! tags in document order and giving each closing tag the id of the innermost
//! open tag. `decount` reverses it.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::markup::opening_len;
use std::fmt::Write;
use std::ops::Range;
use suit_span::Span;

/// Numbers every reserved opening and closing tag in `text`.
///
/// Opening tags that are never closed keep their id and are treated as
/// literal text by [`extract`].
pub fn count(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut open: Vec<(u32, &str)> = Vec::new();
    let mut next_id = 0u32;

    for token in Lexer::new(text) {
        match token.kind {
            TokenKind::OpenTag => {
                let Some((name, tail)) = token.raw_parts(text) else {
                    out.push_str(token.slice(text));
                    continue;
                };
                let _ = write!(out, "<{name}_{next_id}{tail}");
                open.push((next_id, name));
                next_id += 1;
            }
            TokenKind::CloseTag => {
                let Some((name, tail)) = token.raw_parts(text) else {
                    out.push_str(token.slice(text));
                    continue;
                };
                let (id, expected) = loop {
                    match open.pop() {
                        None => {
                            return Err(ParseError::new(
                                ParseErrorKind::UnmatchedClosingTag {
                                    name: name.to_string(),
                                },
                                token.span,
                            ));
                        }
                        Some((id, expected)) if expected == name => break (id, expected),
                        Some((_, expected)) => {
                            // An opener that is never closed anywhere stays literal text.
                            if closes_later(text, &token, expected) {
                                return Err(ParseError::new(
                                    ParseErrorKind::MismatchedClosingTag {
                                        expected: expected.to_string(),
                                        found: name.to_string(),
                                    },
                                    token.span,
                                ));
                            }
                        }
                    }
                };
                let _ = write!(out, "</{expected}_{id}{tail}");
            }
            TokenKind::Eof => break,
            _ => out.push_str(token.slice(text)),
        }
    }

    Ok(out)
}

/// Removes the ids that [`count`] added.
pub fn decount(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for token in Lexer::new(text) {
        match token.kind {
            TokenKind::CountedOpenTag => match token.counted_parts(text) {
                Some((name, _)) => {
                    out.push('<');
                    out.push_str(name);
                }
                None => out.push_str(token.slice(text)),
            },
            TokenKind::CountedCloseTag => match token.counted_parts(text) {
                Some((name, _)) => {
                    out.push_str("</");
                    out.push_str(name);
                }
                None => out.push_str(token.slice(text)),
            },
            TokenKind::Eof => break,
            _ => out.push_str(token.slice(text)),
        }
    }

    out
}

/// A counted reserved tag located in counted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The tag name.
    pub name: String,
    /// The id assigned by [`count`].
    pub id: u32,
    /// The whole tag, opening `<` through the closing `>`.
    pub range: Range<usize>,
    /// The opening portion.
    pub opening: Range<usize>,
    /// The body between the opening portion and the closing tag.
    pub body: Range<usize>,
}

impl Element {
    /// Returns true if `other` lies inside this element's body.
    pub fn encloses(&self, other: &Element) -> bool {
        self.body.start <= other.range.start && other.range.end <= self.body.end
    }

    /// Returns true if `other` lies inside this element's opening portion.
    pub fn opening_contains(&self, other: &Element) -> bool {
        self.opening.start < other.range.start && other.range.end <= self.opening.end
    }

    /// Returns the span of the whole element.
    pub fn span(&self) -> Span {
        Span::from_range(self.range.clone())
    }
}

/// Locates every closed counted tag in `counted`, at every depth, in document order.
pub fn elements(counted: &str) -> Vec<Element> {
    let tokens: Vec<Token> = Lexer::new(counted).collect();
    let mut found = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::CountedOpenTag {
            continue;
        }
        let Some((name, id)) = token.counted_parts(counted) else {
            continue;
        };
        let start = token.span.range().start;

        let close = tokens[i + 1..].iter().find(|t| {
            t.kind == TokenKind::CountedCloseTag && t.counted_parts(counted) == Some((name, id))
        });
        let Some(close) = close else {
            continue;
        };
        let close_range = close.span.range();
        let Some(end) = closing_gt(counted, close_range.end) else {
            continue;
        };

        let opening_end = (start + opening_len(&counted[start..])).min(close_range.start);
        found.push(Element {
            name: name.to_string(),
            id,
            range: start..end,
            opening: start..opening_end,
            body: opening_end..close_range.start,
        });
    }

    found
}

/// Returns the ranges of the outermost closed reserved tags in counted text.
///
/// The ranges are disjoint and ordered. Text between them is literal.
pub fn extract(counted: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for element in elements(counted) {
        if ranges
            .last()
            .is_some_and(|last| element.range.start < last.end)
        {
            continue;
        }
        ranges.push(element.range);
    }
    ranges
}

/// Returns the offset just past the `>` that ends a closing tag whose name ends at `from`.
fn closing_gt(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let trimmed = rest.trim_start();
    trimmed
        .starts_with('>')
        .then(|| from + (rest.len() - trimmed.len()) + 1)
}

/// Returns true if a closing tag for `name` appears after `token`.
fn closes_later(text: &str, token: &Token, name: &str) -> bool {
    Lexer::new(&text[token.span.range().start..]).any(|t| {
        t.kind == TokenKind::CloseTag
            && t.raw_parts(&text[token.span.range().start..])
                .is_some_and(|(n, _)| n == name)
    })
}
