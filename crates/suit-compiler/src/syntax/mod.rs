//! Backend emitters.
//!
//! A [`Syntax`] turns each tag kind into target code. The tree walk that
//! decides which operation a tag needs lives in [`crate::codegen`]; emitters
//! only build output.

mod javascript;
mod native;
mod python;

pub use javascript::{javascript_unit, JavaScript};
pub use native::Native;
pub use python::{python_unit, Python};

use suit_parser::PathSegment;
use suit_runtime::Filter;

/// Code generation for one backend.
pub trait Syntax {
    /// What the emitter produces: source text, or a runtime program.
    type Output;

    /// Literal text interleaved with compiled children.
    /// `pieces.len() == children.len() + 1`.
    fn literal(&self, pieces: &[String], children: Vec<Self::Output>) -> Self::Output;

    /// A safe data lookup that yields the default, or the absent sentinel, on failure.
    fn var(&self, path: &[PathSegment], default: Option<Self::Output>) -> Self::Output;

    fn filter(
        &self,
        filter: Filter,
        input: Self::Output,
        argument: Option<Self::Output>,
    ) -> Self::Output;

    /// Renders collections as JSON and passes other values through.
    fn stringify(&self, value: Self::Output) -> Self::Output;

    /// Encodes a value as JSON text, for include overlays.
    fn json(&self, value: Self::Output) -> Self::Output;

    /// The current key of the loop binding `name`, with an optional suffix such as `+1`.
    fn loop_key(&self, name: &str, modifier: Option<&str>) -> Self::Output;

    fn condition(
        &self,
        condition: Self::Output,
        on_true: Self::Output,
        on_false: Self::Output,
    ) -> Self::Output;

    fn list(&self, body: Self::Output, bound: &str, iterable: Self::Output) -> Self::Output;

    fn expression(&self, inner: Self::Output) -> Self::Output;

    /// Runs `body` against the ambient data merged with `overlay`.
    fn scope(&self, overlay: Self::Output, body: Self::Output) -> Self::Output;

    fn logic_and(&self) -> &'static str {
        "&&"
    }

    fn logic_or(&self) -> &'static str {
        "||"
    }

    fn logic_not(&self) -> &'static str {
        "!"
    }

    fn true_literal(&self) -> &'static str {
        "true"
    }

    fn false_literal(&self) -> &'static str {
        "false"
    }

    /// Rewrites the literal pieces of a condition into this backend's operator
    /// and boolean spellings. Quoted strings are left alone, including quotes
    /// that open in one piece and close after an embedded tag.
    fn spell_condition(&self, pieces: &[String]) -> Vec<String> {
        let spellings = [
            self.logic_and(),
            self.logic_or(),
            self.logic_not(),
            self.true_literal(),
            self.false_literal(),
        ];
        if spellings == ["&&", "||", "!", "true", "false"] {
            return pieces.to_vec();
        }
        respell_pieces(pieces, &spellings)
    }
}

fn respell_pieces<S: AsRef<str>>(pieces: &[S], spellings: &[&str; 5]) -> Vec<String> {
    let mut quote = None;
    let last = pieces.len().saturating_sub(1);
    pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| {
            respell(piece.as_ref(), spellings, &mut quote, index > 0, index < last)
        })
        .collect()
}

/// Respells one literal piece. `quote` carries an open string across pieces;
/// `after_tag` and `before_tag` mark embedded tag output around `text`.
fn respell(
    text: &str,
    spellings: &[&str; 5],
    quote: &mut Option<char>,
    after_tag: bool,
    before_tag: bool,
) -> String {
    let [and, or, not, yes, no] = *spellings;
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    let spaced = |out: &mut String, word: &str, next: Option<&char>| {
        if (after_tag || !out.is_empty()) && !out.ends_with(' ') {
            out.push(' ');
        }
        out.push_str(word);
        if next.map_or(before_tag, |c| *c != ' ') {
            out.push(' ');
        }
    };

    while i < chars.len() {
        let c = chars[i];
        if let Some(open) = *quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.get(i + 1) {
                    out.push(*escaped);
                    i += 1;
                }
            } else if c == open {
                *quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            '\'' | '"' => {
                *quote = Some(c);
                out.push(c);
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                spaced(&mut out, and, chars.get(i + 2));
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                spaced(&mut out, or, chars.get(i + 2));
                i += 2;
            }
            '!' if chars.get(i + 1) != Some(&'=') => {
                spaced(&mut out, not, chars.get(i + 1));
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "true" => out.push_str(yes),
                    "false" => out.push_str(no),
                    _ => out.push_str(&word),
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PYTHON: [&str; 5] = ["and", "or", "not", "True", "False"];

    fn python(pieces: &[&str]) -> Vec<String> {
        respell_pieces(pieces, &PYTHON)
    }

    #[test]
    fn test_respell_operators_and_literals() {
        assert_eq!(python(&["1 > 0 && !x || true"]), ["1 > 0 and not x or True"]);
        assert_eq!(python(&["a&&b"]), ["a and b"]);
        assert_eq!(python(&["a != b"]), ["a != b"]);
    }

    #[test]
    fn test_respell_skips_strings_and_identifiers() {
        assert_eq!(
            python(&["'a && true' == trueish"]),
            ["'a && true' == trueish"]
        );
    }

    #[test]
    fn test_respell_keeps_quote_open_across_tags() {
        assert_eq!(
            python(&["'", "' == 'b' && true"]),
            ["'", "' == 'b' and True"]
        );
        assert_eq!(
            python(&["\"x ", " && y\" || ", "&&false"]),
            ["\"x ", " && y\" or ", " and False"]
        );
    }

    #[test]
    fn test_respell_mixed_quoted_and_bare_pieces() {
        assert_eq!(
            python(&["!", " && '", "' != 'true' || true"]),
            ["not ", " and '", "' != 'true' or True"]
        );
    }
}
