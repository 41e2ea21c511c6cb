//! Loop body rewriting.
//!
//! Before a `<list>` body is parsed, references to the loop bindings are
//! rewritten into tags that address the current element directly:
//!
//! 1. a nested list iterating over `V...` iterates over `E[K]...` instead
//! 2. `<var>i</var>` becomes a 1-based counter `<iterationkey>`
//! 3. `<var>V...</var>` becomes `<iterationvar in=E name=K path=...>`
//! 4. when destructuring, `<var>K</var>` becomes `<iterationkey name=K>`
//!
//! `K` and `V` are the key and value names of the loop and `E` is the iterable
//! path. References inside a nested list that binds the same name are left
//! for that list to rewrite.

use crate::counter::{count, decount, elements, Element};
use crate::error::ParseError;
use crate::markup::{quote_attribute, scan_attributes, Markup};
use std::ops::Range;

/// The bindings introduced by one `<list>` tag.
#[derive(Debug, Clone, Copy)]
pub struct LoopBinding<'a> {
    /// The name bound to the index or mapping key.
    pub key: &'a str,
    /// The name bound to the element.
    pub value: &'a str,
    /// The iterable path as written in the `in` attribute.
    pub iterable: &'a str,
}

impl LoopBinding<'_> {
    fn is_destructuring(&self) -> bool {
        self.key != self.value
    }
}

/// Applies all four rewrites to a list body.
pub fn rewrite_list_body(body: &str, binding: &LoopBinding<'_>) -> Result<String, ParseError> {
    let body = rewrite_nested_iterables(body, binding)?;
    let body = rewrite_counter(&body, binding)?;
    let body = rewrite_values(&body, binding)?;
    if binding.is_destructuring() {
        rewrite_keys(&body, binding)
    } else {
        Ok(body)
    }
}

struct Edit {
    range: Range<usize>,
    text: String,
}

/// Rewrites nested `<list in="V...">` to `<list in="E[K]...">`.
fn rewrite_nested_iterables(body: &str, binding: &LoopBinding<'_>) -> Result<String, ParseError> {
    let counted = count(body)?;
    let found = elements(&counted);
    let mut edits = Vec::new();

    for (idx, element) in found.iter().enumerate() {
        if element.name != "list" || rebinds(&counted, &found, idx, &[binding.value]) {
            continue;
        }
        let opening = &counted[element.opening.clone()];
        let Some(span) = scan_attributes(opening)
            .into_iter()
            .filter(|span| &opening[span.name.clone()] == "in")
            .last()
        else {
            continue;
        };

        let value = &opening[span.value.clone()];
        let reference = if value.trim_start().starts_with("<var") {
            Markup::parse(value.trim()).body
        } else {
            value.trim()
        };
        let Some(rest) = strip_binding(reference, binding.value) else {
            continue;
        };

        let rewritten = format!("{}[{}]{}", binding.iterable, binding.key, rest);
        let start = element.opening.start + span.value.start - 1;
        let end = element.opening.start + span.value.end + 1;
        edits.push(Edit {
            range: start..end,
            text: quote_attribute(&rewritten, span.quote),
        });
    }

    Ok(decount(&apply(&counted, edits)))
}

/// Rewrites `<var>i</var>` to a 1-based loop counter.
fn rewrite_counter(body: &str, binding: &LoopBinding<'_>) -> Result<String, ParseError> {
    rewrite_vars(body, |counted, found, idx| {
        let element = &found[idx];
        let markup = Markup::parse(&counted[element.range.clone()]);
        if !markup.attribute_text().trim().is_empty() || markup.body != "i" {
            return None;
        }
        if found
            .iter()
            .any(|other| other.name == "list" && other.encloses(element))
        {
            return None;
        }
        let quote = attribute_quote(counted, found, idx);
        Some(format!(
            "<iterationkey name={} mod={}></iterationkey>",
            quote_attribute(binding.key, quote),
            quote_attribute("+1", quote),
        ))
    })
}

/// Rewrites `<var>V...</var>` to an iteration variable.
fn rewrite_values(body: &str, binding: &LoopBinding<'_>) -> Result<String, ParseError> {
    rewrite_vars(body, |counted, found, idx| {
        let element = &found[idx];
        let markup = Markup::parse(&counted[element.range.clone()]);
        let path = strip_binding(markup.body, binding.value)?;
        if rebinds(counted, found, idx, &[binding.value]) {
            return None;
        }
        let quote = attribute_quote(counted, found, idx);
        Some(format!(
            "<iterationvar in={} name={} path={}{}></iterationvar>",
            quote_attribute(binding.iterable, quote),
            quote_attribute(binding.key, quote),
            quote_attribute(path, quote),
            markup.attribute_text().trim_end(),
        ))
    })
}

/// Rewrites `<var>K</var>` to the loop key when destructuring.
fn rewrite_keys(body: &str, binding: &LoopBinding<'_>) -> Result<String, ParseError> {
    rewrite_vars(body, |counted, found, idx| {
        let element = &found[idx];
        let markup = Markup::parse(&counted[element.range.clone()]);
        if !markup.attribute_text().trim().is_empty() || markup.body != binding.key {
            return None;
        }
        if rebinds(counted, found, idx, &[binding.key]) {
            return None;
        }
        let quote = attribute_quote(counted, found, idx);
        Some(format!(
            "<iterationkey name={}></iterationkey>",
            quote_attribute(binding.key, quote),
        ))
    })
}

/// Replaces `<var>` elements chosen by `replace`, innermost first, until none is left.
fn rewrite_vars<F>(body: &str, replace: F) -> Result<String, ParseError>
where
    F: Fn(&str, &[Element], usize) -> Option<String>,
{
    let mut text = body.to_string();

    loop {
        let counted = count(&text)?;
        let found = elements(&counted);
        let candidates: Vec<(usize, String)> = found
            .iter()
            .enumerate()
            .filter(|(_, element)| element.name == "var")
            .filter_map(|(idx, _)| replace(&counted, &found, idx).map(|text| (idx, text)))
            .collect();

        // Only rewrite elements with no other candidate inside them.
        let edits: Vec<Edit> = candidates
            .iter()
            .filter(|(idx, _)| {
                let range = &found[*idx].range;
                !candidates.iter().any(|(other, _)| {
                    other != idx
                        && range.start <= found[*other].range.start
                        && found[*other].range.end <= range.end
                })
            })
            .map(|(idx, text)| Edit {
                range: found[*idx].range.clone(),
                text: text.clone(),
            })
            .collect();

        if edits.is_empty() {
            return Ok(text);
        }
        text = decount(&apply(&counted, edits));
    }
}

/// Returns the path after `name` if `reference` is `name` alone or followed by `.` or `[`.
fn strip_binding<'a>(reference: &'a str, name: &str) -> Option<&'a str> {
    let rest = reference.strip_prefix(name)?;
    (rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')).then_some(rest)
}

/// Returns true if a list enclosing `found[idx]` binds any of `names`.
fn rebinds(counted: &str, found: &[Element], idx: usize, names: &[&str]) -> bool {
    let element = &found[idx];
    found.iter().any(|other| {
        other.name == "list"
            && other.encloses(element)
            && Markup::parse(&counted[other.opening.clone()])
                .attribute("for")
                .is_some_and(|bound| bound.split(',').any(|n| names.contains(&n.trim())))
    })
}

/// Picks the quote for attributes of a replacement tag so it can sit inside
/// the attribute value that contains `found[idx]`, if any.
fn attribute_quote(counted: &str, found: &[Element], idx: usize) -> char {
    let element = &found[idx];
    for other in found {
        if !other.opening_contains(element) {
            continue;
        }
        let opening = &counted[other.opening.clone()];
        let inside = scan_attributes(opening).into_iter().find(|span| {
            let value = other.opening.start + span.value.start..other.opening.start + span.value.end;
            value.start <= element.range.start && element.range.end <= value.end
        });
        if let Some(span) = inside {
            return if span.quote == '\'' { '"' } else { '\'' };
        }
    }
    '\''
}

fn apply(text: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| std::cmp::Reverse(edit.range.start));
    let mut out = text.to_string();
    for edit in edits {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sequence<'a>(name: &'a str, iterable: &'a str) -> LoopBinding<'a> {
        LoopBinding {
            key: name,
            value: name,
            iterable,
        }
    }

    #[test]
    fn test_value_reference() {
        let out = rewrite_list_body("<var>num</var>,", &sequence("num", "numbers")).unwrap();
        assert_eq!(
            out,
            "<iterationvar in='numbers' name='num' path=''></iterationvar>,"
        );
    }

    #[test]
    fn test_value_reference_with_path_and_filter() {
        let out = rewrite_list_body(
            "<var filter=\"length\">user.name</var>",
            &sequence("user", "users"),
        )
        .unwrap();
        assert_eq!(
            out,
            "<iterationvar in='users' name='user' path='.name' filter=\"length\"></iterationvar>"
        );
    }

    #[test]
    fn test_prefix_name_is_not_a_reference() {
        let body = "<var>numbers</var>";
        let out = rewrite_list_body(body, &sequence("num", "items")).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_counter() {
        let out = rewrite_list_body("<var>i</var>", &sequence("x", "xs")).unwrap();
        assert_eq!(out, "<iterationkey name='x' mod='+1'></iterationkey>");
    }

    #[test]
    fn test_counter_inside_condition_attribute() {
        let out = rewrite_list_body(
            "<if condition='<var>i</var> == 1'>first</if>",
            &sequence("x", "xs"),
        )
        .unwrap();
        assert_eq!(
            out,
            "<if condition='<iterationkey name=\"x\" mod=\"+1\"></iterationkey> == 1'>first</if>"
        );
    }

    #[test]
    fn test_destructuring_keys() {
        let binding = LoopBinding {
            key: "k",
            value: "v",
            iterable: "dict",
        };
        let out = rewrite_list_body("<var>k</var>=<var>v</var>", &binding).unwrap();
        assert_eq!(
            out,
            "<iterationkey name='k'></iterationkey>=<iterationvar in='dict' name='k' path=''></iterationvar>"
        );
    }

    #[test]
    fn test_nested_list_iterable() {
        let out = rewrite_list_body(
            "<list for='region' in='<var>country.Regions</var>'><var>region</var></list>",
            &sequence("country", "places"),
        )
        .unwrap();
        assert_eq!(
            out,
            "<list for='region' in='places[country].Regions'><var>region</var></list>"
        );
    }

    #[test]
    fn test_outer_value_inside_nested_list() {
        let out = rewrite_list_body(
            "<list for='b' in='bs'><var>a.x</var><var>i</var></list>",
            &sequence("a", "as"),
        )
        .unwrap();
        assert_eq!(
            out,
            "<list for='b' in='bs'><iterationvar in='as' name='a' path='.x'></iterationvar><var>i</var></list>"
        );
    }

    #[test]
    fn test_shadowing_list_keeps_inner_references() {
        let body = "<list for='a' in='other'><var>a</var></list>";
        let out = rewrite_list_body(body, &sequence("a", "as")).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_default_holding_reference() {
        let out = rewrite_list_body(
            "<var d=\"<var>n</var>\">missing</var>",
            &sequence("n", "ns"),
        )
        .unwrap();
        assert_eq!(
            out,
            "<var d=\"<iterationvar in='ns' name='n' path=''></iterationvar>\">missing</var>"
        );
    }
}
