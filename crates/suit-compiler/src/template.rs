//! Template composition.
//!
//! Loading a template strips comments, takes out its first `<style>` and bare
//! `<script>` blocks, resolves `<rebase>` against the parent's breakpoints and
//! replaces every `<breakpoint include=...>` with the included template.

use crate::error::CompileError;
use crate::source::{unquote_name, TemplateSource};
use indexmap::IndexMap;
use suit_parser::{count, decount, elements, Element, Markup, ParseError, TemplatePart};
use tracing::debug;

/// A template after composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// The dotted template name.
    pub name: String,
    /// The markup after rebase and include resolution.
    pub content: String,
    /// The inner text of the first `<style>` block.
    pub style: Option<String>,
    /// The inner text of the first bare `<script>` block.
    pub script: Option<String>,
}

impl Template {
    /// Loads and composes the template `name`.
    pub fn load(name: &str, source: &impl TemplateSource) -> Result<Self, CompileError> {
        Composer { source }.resolve(name, None, &mut Vec::new())
    }

    /// Composes `markup` as the template `name`; rebase and include targets
    /// are loaded from `source`.
    pub fn from_markup(
        name: &str,
        markup: &str,
        source: &impl TemplateSource,
    ) -> Result<Self, CompileError> {
        let mut chain = vec![name.to_string()];
        Composer { source }.compose(name, markup, &mut chain)
    }

    /// Parses the composed content.
    pub fn parse(&self) -> Result<TemplatePart, CompileError> {
        TemplatePart::parse(&self.content).map_err(parse_error(&self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    Rebase,
    Include,
}

struct Composer<'a, S: ?Sized> {
    source: &'a S,
}

impl<S: TemplateSource + ?Sized> Composer<'_, S> {
    fn resolve(
        &self,
        name: &str,
        hop: Option<(Hop, &str)>,
        chain: &mut Vec<String>,
    ) -> Result<Template, CompileError> {
        if chain.iter().any(|entered| entered == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(match hop {
                Some((Hop::Include, _)) => CompileError::IncludeCycle { chain: cycle },
                _ => CompileError::RebaseCycle { chain: cycle },
            });
        }

        let markup = self
            .source
            .load(name)
            .ok_or_else(|| CompileError::TemplateNotFound {
                name: name.to_string(),
                requested_by: hop.map_or(name, |(_, by)| by).to_string(),
            })?;

        chain.push(name.to_string());
        let template = self.compose(name, &markup, chain);
        chain.pop();
        template
    }

    fn compose(
        &self,
        name: &str,
        markup: &str,
        chain: &mut Vec<String>,
    ) -> Result<Template, CompileError> {
        let content = strip_comments(markup);
        let (content, style) = take_block(&content, "<style", "</style>");
        let (content, script) = take_block(&content, "<script>", "</script>");
        let content = self.rebase(name, content, chain)?;
        let content = self.include(name, &content, chain)?;

        Ok(Template {
            name: name.to_string(),
            content,
            style,
            script,
        })
    }

    fn rebase(
        &self,
        name: &str,
        content: String,
        chain: &mut Vec<String>,
    ) -> Result<String, CompileError> {
        let counted = count(&content).map_err(parse_error(name))?;
        let found = elements(&counted);
        let Some(directive) = found.iter().find(|element| element.name == "rebase") else {
            return Ok(content);
        };

        let parent_name = decount(&counted[directive.body.clone()]);
        let parent_name = unquote_name(&parent_name);
        debug!(template = name, parent = parent_name, "resolving rebase");
        let parent = self.resolve(parent_name, Some((Hop::Rebase, name)), chain)?;

        let parent_slots =
            breakpoint_slots(&parent.content, true).map_err(parse_error(&parent.name))?;
        let own_slots = slots(&counted, &found, false);

        let mut rebased = parent.content;
        for (slot, span) in &parent_slots {
            if let Some(replacement) = own_slots.get(slot) {
                debug!(template = name, slot = slot.as_str(), "overriding breakpoint");
                rebased = rebased.replace(span.as_str(), replacement);
            }
        }
        Ok(rebased)
    }

    fn include(
        &self,
        name: &str,
        content: &str,
        chain: &mut Vec<String>,
    ) -> Result<String, CompileError> {
        let counted = count(content).map_err(parse_error(name))?;
        let mut out = String::with_capacity(content.len());
        let mut cursor = 0;

        for element in elements(&counted) {
            if element.name != "breakpoint" || element.range.start < cursor {
                continue;
            }
            let text = decount(&counted[element.range.clone()]);
            let markup = Markup::parse(&text);
            let Some(target) = markup.attribute("include") else {
                continue;
            };
            let target = unquote_name(target);

            debug!(template = name, target, "resolving include");
            let included = self.resolve(target, Some((Hop::Include, name)), chain)?;

            let overlay = Some(markup.body)
                .filter(|body| !body.is_empty())
                .or_else(|| markup.attribute("data").map(str::trim))
                .filter(|overlay| !overlay.is_empty());

            out.push_str(&decount(&counted[cursor..element.range.start]));
            match overlay {
                Some(overlay) => {
                    let quote = overlay_quote(overlay).ok_or_else(|| CompileError::Unsupported {
                        template: name.to_string(),
                        tag: "breakpoint".to_string(),
                        message: format!(
                            "include overlay for `{target}` uses both quote characters"
                        ),
                    })?;
                    out.push_str(&format!(
                        "<breakpoint data={quote}{overlay}{quote}>{}</breakpoint>",
                        included.content
                    ));
                }
                None => out.push_str(&included.content),
            }
            cursor = element.range.end;
        }

        out.push_str(&decount(&counted[cursor..]));
        Ok(out)
    }
}

fn parse_error(template: &str) -> impl Fn(ParseError) -> CompileError + '_ {
    move |source| CompileError::Parse {
        template: template.to_string(),
        source,
    }
}

/// Returns the named breakpoints of `content`, each mapped to its exact text.
///
/// With `all_levels` false, breakpoints nested in other breakpoints are skipped.
fn breakpoint_slots(
    content: &str,
    all_levels: bool,
) -> Result<IndexMap<String, String>, ParseError> {
    let counted = count(content)?;
    Ok(slots(&counted, &elements(&counted), all_levels))
}

fn slots(counted: &str, found: &[Element], all_levels: bool) -> IndexMap<String, String> {
    let breakpoints: Vec<&Element> = found
        .iter()
        .filter(|element| element.name == "breakpoint")
        .collect();

    let mut slots = IndexMap::new();
    for element in &breakpoints {
        let nested = breakpoints.iter().any(|outer| outer.encloses(element));
        if nested && !all_levels {
            continue;
        }
        let text = decount(&counted[element.range.clone()]);
        let Some(name) = Markup::parse(&text)
            .attribute("name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        slots.insert(name, text);
    }
    slots
}

/// Removes `<!-- ... -->` comments. An unterminated comment is kept.
fn strip_comments(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find("<!--") {
        let Some(len) = rest[start + 4..].find("-->") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + 4 + len + 3..];
    }
    out.push_str(rest);
    out
}

/// Removes the first block opened by `open` and closed by `close`, returning
/// its inner text. `open` must be followed by whitespace or `>` unless it
/// already ends with `>`.
fn take_block(content: &str, open: &str, close: &str) -> (String, Option<String>) {
    let mut from = 0;
    while let Some(offset) = content[from..].find(open) {
        let start = from + offset;
        let after = start + open.len();
        from = after;

        let opening_end = if open.ends_with('>') {
            after
        } else {
            match content[after..].chars().next() {
                Some('>') => after + 1,
                Some(c) if c.is_whitespace() => match content[after..].find('>') {
                    Some(gt) => after + gt + 1,
                    None => return (content.to_string(), None),
                },
                _ => continue,
            }
        };

        let Some(close_at) = content[opening_end..].find(close) else {
            return (content.to_string(), None);
        };
        let inner_end = opening_end + close_at;
        let inner = content[opening_end..inner_end].to_string();
        let mut rest = String::with_capacity(content.len());
        rest.push_str(&content[..start]);
        rest.push_str(&content[inner_end + close.len()..]);
        return (rest, Some(inner));
    }
    (content.to_string(), None)
}

fn overlay_quote(overlay: &str) -> Option<char> {
    ['\'', '"'].into_iter().find(|quote| !overlay.contains(*quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;

    fn load(templates: &[(&str, &str)], name: &str) -> Result<Template, CompileError> {
        let source: MemorySource = templates.iter().copied().collect();
        Template::load(name, &source)
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a<!-- x -->b<!--\ny\n-->c"), "abc");
        assert_eq!(strip_comments("a<!-- open"), "a<!-- open");
    }

    #[test]
    fn test_assets_are_extracted() {
        let template = load(
            &[(
                "page",
                "<style media='all'>p { color: red }</style><p>x</p><script>init</script><script src='a.js'></script>",
            )],
            "page",
        )
        .unwrap();
        assert_eq!(template.style.as_deref(), Some("p { color: red }"));
        assert_eq!(template.script.as_deref(), Some("init"));
        assert_eq!(template.content, "<p>x</p><script src='a.js'></script>");
    }

    #[test]
    fn test_styles_prefix_is_not_a_style_block() {
        let (content, style) = take_block("<styles>x</styles>", "<style", "</style>");
        assert_eq!(content, "<styles>x</styles>");
        assert_eq!(style, None);
    }

    #[test]
    fn test_rebase_overrides_slot() {
        let template = load(
            &[
                ("parent", "1<breakpoint name='X'>BASE</breakpoint>3"),
                ("child", "<rebase>parent</rebase><breakpoint name='X'>CHILD</breakpoint>"),
            ],
            "child",
        )
        .unwrap();
        assert_eq!(template.content, "1<breakpoint name='X'>CHILD</breakpoint>3");
    }

    #[test]
    fn test_rebase_keeps_unoverridden_and_drops_unknown_slots() {
        let template = load(
            &[
                (
                    "base",
                    "<breakpoint name='head'>H<breakpoint name='title'>T</breakpoint></breakpoint>|<breakpoint name='body'>B</breakpoint>",
                ),
                (
                    "page",
                    "<rebase>'base'</rebase><breakpoint name='title'>Mine</breakpoint><breakpoint name='extra'>E</breakpoint>",
                ),
            ],
            "page",
        )
        .unwrap();
        assert_eq!(
            template.content,
            "<breakpoint name='head'>H<breakpoint name='title'>Mine</breakpoint></breakpoint>|<breakpoint name='body'>B</breakpoint>"
        );
    }

    #[test]
    fn test_rebase_chain() {
        let template = load(
            &[
                (
                    "grand",
                    "A<breakpoint name='x'>g</breakpoint>B<breakpoint name='y'>g</breakpoint>",
                ),
                ("parent", "<rebase>grand</rebase><breakpoint name='x'>p</breakpoint>"),
                ("child", "<rebase>parent</rebase><breakpoint name='y'>c</breakpoint>"),
            ],
            "child",
        )
        .unwrap();
        assert_eq!(
            template.content,
            "A<breakpoint name='x'>p</breakpoint>B<breakpoint name='y'>c</breakpoint>"
        );
    }

    #[test]
    fn test_rebase_cycle() {
        let err = load(
            &[("a", "<rebase>b</rebase>"), ("b", "<rebase>a</rebase>")],
            "a",
        )
        .unwrap_err();
        match err {
            CompileError::RebaseCycle { chain } => assert_eq!(chain, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_include_without_overlay() {
        let template = load(
            &[
                ("part", "<b><var>x</var></b>"),
                ("page", "[<breakpoint include='part'></breakpoint>]"),
            ],
            "page",
        )
        .unwrap();
        assert_eq!(template.content, "[<b><var>x</var></b>]");
    }

    #[test]
    fn test_include_with_overlay() {
        let template = load(
            &[
                ("part", "-<var>a</var>-"),
                ("page", r#"<breakpoint include="part">{"a": 0}</breakpoint>"#),
            ],
            "page",
        )
        .unwrap();
        assert_eq!(
            template.content,
            r#"<breakpoint data='{"a": 0}'>-<var>a</var>-</breakpoint>"#
        );
    }

    #[test]
    fn test_include_nested_in_markup() {
        let template = load(
            &[
                ("part", "P"),
                (
                    "page",
                    "<if condition='1'><breakpoint include='part'></breakpoint></if>",
                ),
            ],
            "page",
        )
        .unwrap();
        assert_eq!(template.content, "<if condition='1'>P</if>");
    }

    #[test]
    fn test_include_cycle_and_missing_target() {
        let err = load(
            &[
                ("a", "<breakpoint include='b'></breakpoint>"),
                ("b", "<breakpoint include='a'></breakpoint>"),
            ],
            "a",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::IncludeCycle { .. }), "{err}");

        let err = load(&[("a", "<breakpoint include='gone'></breakpoint>")], "a").unwrap_err();
        assert_eq!(err.to_string(), "a: template `gone` not found");
    }
}
