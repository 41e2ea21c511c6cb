//! Template lexer using logos.
//!
//! The lexer only recognizes the edges of reserved tags. Everything else,
//! including markup for tags that are not reserved, is plain text:
//! - Raw opening and closing reserved tags (`<var `, `</list>`)
//! - Counted opening and closing reserved tags (`<var_3`, `</list_0`)
//! - A lone `<` that starts nothing reserved
//! - Runs of text without `<`

use logos::Logos;
use suit_span::Span;
use text_size::TextSize;

/// The reserved tag names. The lexer patterns below must list the same names.
pub const RESERVED_TAGS: &[&str] = &[
    "var",
    "if",
    "list",
    "breakpoint",
    "expression",
    "condition",
    "true",
    "false",
    "iterationvar",
    "iterationkey",
    "rebase",
];

/// Returns true if `name` is a reserved tag name.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_TAGS.contains(&name)
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for template markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
pub enum TokenKind {
    /// `<var ` or `<var>`: the terminating whitespace or `>` is part of the token.
    #[regex(
        r"<(var|if|list|breakpoint|expression|condition|true|false|iterationvar|iterationkey|rebase)[ \t\r\n>]"
    )]
    OpenTag,

    /// `</var>` or `</var `: the terminating whitespace or `>` is part of the token.
    #[regex(
        r"</(var|if|list|breakpoint|expression|condition|true|false|iterationvar|iterationkey|rebase)[ \t\r\n>]"
    )]
    CloseTag,

    /// `<var_3`
    #[regex(
        r"<(var|if|list|breakpoint|expression|condition|true|false|iterationvar|iterationkey|rebase)_[0-9]+"
    )]
    CountedOpenTag,

    /// `</var_3`
    #[regex(
        r"</(var|if|list|breakpoint|expression|condition|true|false|iterationvar|iterationkey|rebase)_[0-9]+"
    )]
    CountedCloseTag,

    /// `<` that does not start a reserved tag.
    #[token("<")]
    LAngle,

    /// Text content.
    #[regex(r"[^<]+")]
    Text,

    /// End of input.
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns true for raw or counted opening tags.
    pub fn is_open(&self) -> bool {
        matches!(self, TokenKind::OpenTag | TokenKind::CountedOpenTag)
    }

    /// Returns true for raw or counted closing tags.
    pub fn is_close(&self) -> bool {
        matches!(self, TokenKind::CloseTag | TokenKind::CountedCloseTag)
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::OpenTag => "opening tag",
            TokenKind::CloseTag => "closing tag",
            TokenKind::CountedOpenTag => "counted opening tag",
            TokenKind::CountedCloseTag => "counted closing tag",
            TokenKind::LAngle => "'<'",
            TokenKind::Text => "text",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

impl Token {
    /// Returns the text of this token.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source).unwrap_or_default()
    }

    /// Splits a raw tag token into its name and its terminating character.
    ///
    /// `<var>` yields `("var", ">")`, `</if ` yields `("if", " ")`.
    pub fn raw_parts<'a>(&self, source: &'a str) -> Option<(&'a str, &'a str)> {
        let slice = self.slice(source);
        let inner = match self.kind {
            TokenKind::OpenTag => slice.strip_prefix('<')?,
            TokenKind::CloseTag => slice.strip_prefix("</")?,
            _ => return None,
        };
        let split = inner.len().checked_sub(1)?;
        Some((&inner[..split], &inner[split..]))
    }

    /// Splits a counted tag token into its name and id.
    ///
    /// `<var_3` yields `("var", 3)`.
    pub fn counted_parts<'a>(&self, source: &'a str) -> Option<(&'a str, u32)> {
        let slice = self.slice(source);
        let inner = match self.kind {
            TokenKind::CountedOpenTag => slice.strip_prefix('<')?,
            TokenKind::CountedCloseTag => slice.strip_prefix("</")?,
            _ => return None,
        };
        let (name, id) = inner.rsplit_once('_')?;
        Some((name, id.parse().ok()?))
    }
}

/// A lexer for template markup.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the text of the current token.
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => Some(Token {
                kind,
                span: Span::from_range(self.inner.span()),
            }),
            Some(Err(())) => Some(Token {
                kind: TokenKind::Error,
                span: Span::from_range(self.inner.span()),
            }),
            None => {
                self.finished = true;
                let end = TextSize::from(self.source.len() as u32);
                Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(end, end),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_reserved_tags() {
        let tokens = tokenize("<var>a</var>");
        assert_eq!(
            tokens,
            vec![TokenKind::OpenTag, TokenKind::Text, TokenKind::CloseTag]
        );
    }

    #[test]
    fn test_opening_tag_with_attributes() {
        let tokens = tokenize(r#"<list for="x" in="y">"#);
        assert_eq!(tokens, vec![TokenKind::OpenTag, TokenKind::Text]);
    }

    #[test]
    fn test_unreserved_markup_is_text() {
        let tokens = tokenize("<div>a</div>");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LAngle,
                TokenKind::Text,
                TokenKind::LAngle,
                TokenKind::Text
            ]
        );
    }

    #[test]
    fn test_prefix_of_reserved_name_is_text() {
        // `<variable>` and `<ifx>` are not reserved.
        let tokens = tokenize("<variable><ifx>");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LAngle,
                TokenKind::Text,
                TokenKind::LAngle,
                TokenKind::Text
            ]
        );
    }

    #[test]
    fn test_counted_tags() {
        let source = "<var_12>a</var_12>";
        let tokens: Vec<Token> = Lexer::new(source).collect();
        assert_eq!(tokens[0].kind, TokenKind::CountedOpenTag);
        assert_eq!(tokens[0].counted_parts(source), Some(("var", 12)));
        assert_eq!(tokens[2].kind, TokenKind::CountedCloseTag);
        assert_eq!(tokens[2].counted_parts(source), Some(("var", 12)));
    }

    #[test]
    fn test_raw_parts() {
        let source = "<iterationkey name='i'></iterationkey>";
        let tokens: Vec<Token> = Lexer::new(source).collect();
        assert_eq!(tokens[0].raw_parts(source), Some(("iterationkey", " ")));
        assert_eq!(tokens[2].raw_parts(source), Some(("iterationkey", ">")));
    }

    #[test]
    fn test_reserved_list_matches_lexer() {
        for name in RESERVED_TAGS {
            let source = format!("<{name}>");
            assert_eq!(tokenize(&source), vec![TokenKind::OpenTag], "{name}");
        }
    }
}
