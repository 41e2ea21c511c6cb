use pretty_assertions::assert_eq;
use suit_parser::{parse, render_path, TagKind, TemplatePart};

/// Renders a tag tree as one line per node.
fn outline(part: &TemplatePart) -> String {
    let mut lines = Vec::new();
    walk(part, 0, &mut lines);
    lines.join("\n")
}

fn walk(part: &TemplatePart, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    lines.push(format!("{indent}part {:?}", part.placeholder_text()));
    for tag in part.children() {
        match &tag.kind {
            TagKind::Var(var) | TagKind::IterationVar(var) => {
                let filters: Vec<&str> = var.filters.iter().map(|f| f.name.as_str()).collect();
                lines.push(format!(
                    "{indent}- {} {} {:?}",
                    tag.kind.name(),
                    render_path(&var.path),
                    filters
                ));
            }
            TagKind::IterationKey(key) => lines.push(format!(
                "{indent}- iteration key {}{}",
                key.name,
                key.modifier.as_deref().unwrap_or_default()
            )),
            TagKind::Condition(cond) => {
                lines.push(format!("{indent}- condition"));
                walk(&cond.condition, depth + 1, lines);
                walk(&cond.on_true, depth + 1, lines);
                walk(&cond.on_false, depth + 1, lines);
            }
            TagKind::List(list) => {
                lines.push(format!(
                    "{indent}- list {} in {}",
                    list.key_var,
                    render_path(&list.iterable.path)
                ));
                walk(&list.body, depth + 1, lines);
            }
            TagKind::Expression(expr) => {
                lines.push(format!("{indent}- expression"));
                walk(&expr.body, depth + 1, lines);
            }
            TagKind::Breakpoint(bp) => {
                lines.push(format!(
                    "{indent}- breakpoint {:?} include={:?}",
                    bp.name.as_deref(),
                    bp.include.as_deref()
                ));
                walk(&bp.body, depth + 1, lines);
            }
            TagKind::Generic => lines.push(format!("{indent}- <{}>", tag.name)),
        }
    }
}

#[test]
fn test_outline_nested_lists() {
    let source = r#"
        <ul>
            <list for="country" in="places">
                <li><var>country.name</var>
                    <list for="region" in="<var>country.regions</var>">
                        <var>region</var><if condition="<var>i</var> != <var filter='length'>country.regions</var>">, </if>
                    </list>
                </li>
            </list>
        </ul>
    "#;
    let part = parse(source).unwrap();
    let expected = r#"part "<ul>{{ph:0}}</ul>"
- list country in places
  part "<li>{{ph:0}}{{ph:1}}</li>"
  - iteration variable places[country].name []
  - list region in places[country].regions
    part "{{ph:0}}{{ph:1}}"
    - iteration variable places[country].regions[region] []
    - condition
      part "{{ph:0}} != {{ph:1}}"
      - iteration key region+1
      - iteration variable places[country].regions ["length"]
      part ","
      part """#;
    assert_eq!(outline(&part), expected);
}

#[test]
fn test_outline_dict_iteration() {
    let part = parse("<list for='key, value' in='dict'><var>key</var>=<var>value</var>;</list>")
        .unwrap();
    let expected = r#"part "{{ph:0}}"
- list key in dict
  part "{{ph:0}}={{ph:1}};"
  - iteration key key
  - iteration variable dict[key] []"#;
    assert_eq!(outline(&part), expected);
}

#[test]
fn test_outline_breakpoints() {
    let part = parse(
        "<breakpoint name='head'>H<breakpoint name='title'>T</breakpoint></breakpoint><breakpoint include='a.b'></breakpoint>",
    )
    .unwrap();
    let expected = r#"part "{{ph:0}}{{ph:1}}"
- breakpoint Some("head") include=None
  part "H{{ph:0}}"
  - breakpoint Some("title") include=None
    part "T"
- breakpoint None include=Some("a.b")
  part """#;
    assert_eq!(outline(&part), expected);
}

#[test]
fn test_placeholder_text_snapshot() {
    let part = parse("<p>\n  <var>a</var> and <expression>1 + <var>b</var></expression>\n</p>")
        .unwrap();
    insta::assert_snapshot!(part.placeholder_text(), @"<p>{{ph:0}} and {{ph:1}}</p>");
}
