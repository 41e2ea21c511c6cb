//! Raw tag markup: the opening portion, attributes and body of one tag.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::ops::Range;

/// Attribute name to value mapping, in source order.
pub type Attributes = IndexMap<SmolStr, String>;

/// The location of one `name="value"` pair inside an opening portion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    /// Byte range of the attribute name.
    pub name: Range<usize>,
    /// Byte range of the value, quotes excluded.
    pub value: Range<usize>,
    /// The quote character that delimits the value.
    pub quote: char,
}

/// A tag split into its opening portion, name, attributes and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup<'a> {
    /// The full tag text.
    pub text: &'a str,
    /// The opening portion, `<` through its matching `>`.
    pub opening: &'a str,
    /// The tag name.
    pub name: &'a str,
    /// The attributes of the opening portion.
    pub attributes: Attributes,
    /// The body between the opening portion and the closing tag, trimmed.
    pub body: &'a str,
}

impl<'a> Markup<'a> {
    /// Splits tag text that starts with `<name`.
    pub fn parse(text: &'a str) -> Self {
        let opening = &text[..opening_len(text)];
        let name = tag_name(opening);

        let mut attributes = Attributes::new();
        for span in scan_attributes(opening) {
            // Later duplicates replace earlier ones.
            attributes.insert(
                SmolStr::new(&opening[span.name]),
                opening[span.value].to_string(),
            );
        }

        let rest = &text[opening.len()..];
        let body = strip_closing_tag(rest, name).trim();

        Self {
            text,
            opening,
            name,
            attributes,
            body,
        }
    }

    /// Returns the value of the attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the attribute text of the opening portion, without the tag name and `>`.
    pub fn attribute_text(&self) -> &'a str {
        let start = (1 + self.name.len()).min(self.opening.len());
        let inner = &self.opening[start..];
        inner.strip_suffix('>').unwrap_or(inner)
    }
}

/// Returns the byte length of the opening portion of `text`.
///
/// `<` and `>` are depth-counted outside quoted values, so nested markup inside
/// attribute values is skipped. Without a balancing `>` the whole text is returned.
pub fn opening_len(text: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;

    for (i, byte) in text.bytes().enumerate() {
        match (quote, byte) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'<') => depth += 1,
            (None, b'>') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            (None, _) => {}
        }
    }

    text.len()
}

/// Returns the tag name of an opening portion.
pub fn tag_name(opening: &str) -> &str {
    let inner = opening.strip_prefix('<').unwrap_or(opening);
    let end = inner
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(inner.len());
    &inner[..end]
}

/// Finds every `name="value"` or `name='value'` pair preceded by whitespace.
pub fn scan_attributes(opening: &str) -> Vec<AttributeSpan> {
    let bytes = opening.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < len {
        if !bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let name_start = j;
        while j < len
            && !bytes[j].is_ascii_whitespace()
            && !matches!(bytes[j], b'=' | b'>' | b'"' | b'\'')
        {
            j += 1;
        }

        if j > name_start && j + 1 < len && bytes[j] == b'=' && matches!(bytes[j + 1], b'"' | b'\'')
        {
            let quote = bytes[j + 1];
            let value_start = j + 2;
            if let Some(offset) = opening[value_start..].find(quote as char) {
                let value_end = value_start + offset;
                spans.push(AttributeSpan {
                    name: name_start..j,
                    value: value_start..value_end,
                    quote: quote as char,
                });
                i = value_end + 1;
                while i < len && bytes[i] == quote {
                    i += 1;
                }
                continue;
            }
        }

        i = j.max(i + 1);
    }

    spans
}

/// Quotes `value` with `preferred`, or with the other quote character if
/// `value` contains `preferred`.
pub fn quote_attribute(value: &str, preferred: char) -> String {
    let quote = if value.contains(preferred) {
        if preferred == '\'' {
            '"'
        } else {
            '\''
        }
    } else {
        preferred
    };
    format!("{quote}{value}{quote}")
}

/// Normalizes whitespace the way every top-level template text is normalized:
/// tabs and line breaks count as two spaces; runs of two or more spaces are
/// dropped next to `>` or `<` and collapsed to one space elsewhere; leading and
/// trailing spaces are trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    let mut chars = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => chars.extend([' ', ' ']),
            other => chars.push(other),
        }
    }

    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != ' ' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        let run = i - start;

        if run == 1 {
            out.push(' ');
            continue;
        }

        let after_tag = start > 0 && chars[start - 1] == '>';
        let before_tag = i < chars.len() && chars[i] == '<';
        if !after_tag && !before_tag {
            out.push(' ');
        }
    }

    out.trim_matches(' ').to_string()
}

fn strip_closing_tag<'a>(rest: &'a str, name: &str) -> &'a str {
    let trimmed = rest.trim_end();
    let Some(without_gt) = trimmed.strip_suffix('>') else {
        return rest;
    };
    let without_ws = without_gt.trim_end();
    match without_ws
        .strip_suffix(name)
        .and_then(|s| s.strip_suffix("</"))
    {
        Some(body) => body,
        None => rest,
    }
}
