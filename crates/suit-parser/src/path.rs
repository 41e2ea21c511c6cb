//! Data paths: `a.b[0]['c'][key]`.

use smol_str::SmolStr;
use std::fmt;

/// One step of a data path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// `.name` or a leading `name`: a mapping key.
    Field(SmolStr),
    /// `[...]`: the raw bracket contents, resolved at render time as an integer,
    /// a quoted string or a loop-local name.
    Index(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(raw) => write!(f, "[{raw}]"),
        }
    }
}

/// Parses a dotted and bracketed data path.
///
/// Surrounding whitespace and leading or trailing dots are ignored, as are
/// empty fields (`a..b`). Brackets nest, so `a[b[0]]` has the single index `b[0]`.
/// An unterminated `[` makes the rest of the text a field.
pub fn parse_path(reference: &str) -> Vec<PathSegment> {
    let reference = reference.trim().trim_matches('.');
    let mut segments = Vec::new();
    let mut field = String::new();
    let mut chars = reference.char_indices().peekable();

    let flush = |field: &mut String, segments: &mut Vec<PathSegment>| {
        let name = field.trim();
        if !name.is_empty() {
            segments.push(PathSegment::Field(SmolStr::new(name)));
        }
        field.clear();
    };

    while let Some((i, c)) = chars.next() {
        match c {
            '.' => flush(&mut field, &mut segments),
            '[' => match closing_bracket(&reference[i..]) {
                Some(len) => {
                    flush(&mut field, &mut segments);
                    let inner = &reference[i + 1..i + len - 1];
                    segments.push(PathSegment::Index(inner.trim().to_string()));
                    while chars.peek().is_some_and(|(j, _)| *j < i + len) {
                        chars.next();
                    }
                }
                None => field.push(c),
            },
            _ => field.push(c),
        }
    }
    flush(&mut field, &mut segments);

    segments
}

/// Renders segments back into path text.
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            PathSegment::Field(name) if i == 0 => out.push_str(name),
            other => out.push_str(&other.to_string()),
        }
    }
    out
}

/// Returns the byte length of the bracket group that starts `text`, brackets included.
fn closing_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str) -> PathSegment {
        PathSegment::Field(SmolStr::new(name))
    }

    fn index(raw: &str) -> PathSegment {
        PathSegment::Index(raw.to_string())
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(parse_path("a.b.c"), vec![field("a"), field("b"), field("c")]);
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            parse_path("items[0]['name'][key]"),
            vec![field("items"), index("0"), index("'name'"), index("key")]
        );
    }

    #[test]
    fn test_nested_brackets() {
        assert_eq!(
            parse_path("a[b[0]].c"),
            vec![field("a"), index("b[0]"), field("c")]
        );
    }

    #[test]
    fn test_stray_dots_and_whitespace() {
        assert_eq!(parse_path(" .a..b. "), vec![field("a"), field("b")]);
        assert_eq!(parse_path(""), vec![]);
    }

    #[test]
    fn test_unterminated_bracket() {
        assert_eq!(parse_path("a[0"), vec![field("a[0")]);
    }

    #[test]
    fn test_render_path() {
        let path = parse_path("places[country].Regions[0]");
        assert_eq!(render_path(&path), "places[country].Regions[0]");
    }
}
