//! Prompt templates.
//!
//! A small handlebars-style language: `{{path}}` and `{{{path}}}` insert a
//! value (no escaping either way), `{{#each list}}`, `{{#if path}}` and
//! `{{#unless path}}` are block helpers, `{{else}}` splits a conditional and
//! `{{! comment}}` is dropped. Paths are dotted (`gradeAnalysis.gradeTrend`);
//! inside `#each`, `this`, `@index`, `@first` and `@last` refer to the
//! current item.
//!
//! Templates are compiled once, so malformed ones fail at construction and
//! rendering itself cannot fail.

use regex::Regex;
use sahayak_error::{TemplateError, TemplateErrorKind};
use serde_json::Value;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{\s*(?P<raw>[^{}]*?)\s*\}\}\}|\{\{\s*(?P<tag>[^{}]*?)\s*\}\}")
        .expect("tag pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Value(String),
    Each {
        path: String,
        body: Vec<Node>,
    },
    Conditional {
        path: String,
        negate: bool,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Helper {
    Each,
    If,
    Unless,
}

impl Helper {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "each" => Some(Helper::Each),
            "if" => Some(Helper::If),
            "unless" => Some(Helper::Unless),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Helper::Each => "each",
            Helper::If => "if",
            Helper::Unless => "unless",
        }
    }
}

/// A block under construction while parsing.
struct Frame {
    helper: Helper,
    path: String,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

impl Frame {
    fn current(&mut self) -> &mut Vec<Node> {
        match &mut self.otherwise {
            Some(otherwise) => otherwise,
            None => &mut self.then,
        }
    }

    fn finish(self) -> Node {
        match self.helper {
            Helper::Each => Node::Each {
                path: self.path,
                body: self.then,
            },
            Helper::If | Helper::Unless => Node::Conditional {
                path: self.path,
                negate: self.helper == Helper::Unless,
                then: self.then,
                otherwise: self.otherwise.unwrap_or_default(),
            },
        }
    }
}

/// A compiled prompt template.
///
/// # Examples
///
/// ```
/// use sahayak_flow::PromptTemplate;
/// use serde_json::json;
///
/// let template = PromptTemplate::compile(
///     "lesson",
///     "Topic: {{{topic}}}\n{{#each objectives}}- {{this}}\n{{/each}}",
/// )
/// .unwrap();
///
/// let rendered = template.render(&json!({
///     "topic": "Fractions",
///     "objectives": ["Compare", "Add"]
/// }));
/// assert_eq!(rendered, "Topic: Fractions\n- Compare\n- Add\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    name: String,
    nodes: Vec<Node>,
}

impl PromptTemplate {
    /// Parses `source`, reporting structural errors against `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for unknown helpers, unbalanced blocks,
    /// a stray `{{else}}` or an empty placeholder.
    pub fn compile(name: impl Into<String>, source: &str) -> Result<Self, TemplateError> {
        let name = name.into();
        let fail = |kind| TemplateError::new(name.clone(), kind);

        let mut root = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut cursor = 0;

        for caps in TAG.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            let out = match stack.last_mut() {
                Some(frame) => frame.current(),
                None => &mut root,
            };
            if whole.start() > cursor {
                out.push(Node::Text(source[cursor..whole.start()].to_string()));
            }
            cursor = whole.end();

            if let Some(raw) = caps.name("raw") {
                let path = raw.as_str();
                if path.is_empty() {
                    return Err(fail(TemplateErrorKind::EmptyExpression(whole.start())));
                }
                out.push(Node::Value(path.to_string()));
                continue;
            }

            let tag = caps.name("tag").map(|m| m.as_str()).unwrap_or_default();
            if tag.is_empty() {
                return Err(fail(TemplateErrorKind::EmptyExpression(whole.start())));
            }

            if tag.starts_with('!') {
                continue;
            } else if let Some(open) = tag.strip_prefix('#') {
                let (helper_name, path) = split_helper(open);
                let helper = Helper::parse(helper_name)
                    .ok_or_else(|| fail(TemplateErrorKind::UnknownHelper(helper_name.to_string())))?;
                if path.is_empty() {
                    return Err(fail(TemplateErrorKind::EmptyExpression(whole.start())));
                }
                stack.push(Frame {
                    helper,
                    path: path.to_string(),
                    then: Vec::new(),
                    otherwise: None,
                });
            } else if let Some(close) = tag.strip_prefix('/') {
                let close = close.trim();
                let frame = stack
                    .pop()
                    .ok_or_else(|| fail(TemplateErrorKind::UnexpectedClose(close.to_string())))?;
                if frame.helper.name() != close {
                    return Err(fail(TemplateErrorKind::MismatchedClose {
                        expected: frame.helper.name().to_string(),
                        found: close.to_string(),
                    }));
                }
                let node = frame.finish();
                match stack.last_mut() {
                    Some(parent) => parent.current().push(node),
                    None => root.push(node),
                }
            } else if tag == "else" {
                match stack.last_mut() {
                    Some(frame) if frame.helper != Helper::Each && frame.otherwise.is_none() => {
                        frame.otherwise = Some(Vec::new());
                    }
                    _ => return Err(fail(TemplateErrorKind::StrayElse)),
                }
            } else {
                out.push(Node::Value(tag.to_string()));
            }
        }

        if let Some(frame) = stack.pop() {
            return Err(fail(TemplateErrorKind::UnclosedBlock(
                frame.helper.name().to_string(),
            )));
        }
        if cursor < source.len() {
            root.push(Node::Text(source[cursor..].to_string()));
        }

        Ok(Self { name, nodes: root })
    }

    /// Template name used in error reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the template against `root`. Missing values render as empty text.
    pub fn render(&self, root: &Value) -> String {
        let mut out = String::new();
        let scope = Scope {
            value: root,
            index: None,
            parent: None,
        };
        render_nodes(&self.nodes, &scope, &mut out);
        out
    }
}

fn split_helper(open: &str) -> (&str, &str) {
    let open = open.trim();
    match open.split_once(char::is_whitespace) {
        Some((helper, path)) => (helper, path.trim()),
        None => (open, ""),
    }
}

/// Lookup context; `#each` pushes one scope per item.
struct Scope<'a> {
    value: &'a Value,
    index: Option<(usize, usize)>,
    parent: Option<&'a Scope<'a>>,
}

impl Scope<'_> {
    fn lookup(&self, path: &str) -> Option<Value> {
        match path {
            "this" | "." => return Some(self.value.clone()),
            "@index" => return self.index.map(|(i, _)| Value::from(i)),
            "@first" => return self.index.map(|(i, _)| Value::Bool(i == 0)),
            "@last" => return self.index.map(|(i, len)| Value::Bool(i + 1 == len)),
            _ => {}
        }

        if let Some(rest) = path.strip_prefix("this.") {
            return resolve(self.value, rest).cloned();
        }
        if let Some(rest) = path.strip_prefix("../") {
            return self.parent.and_then(|p| p.lookup(rest));
        }

        // Unqualified paths try the current item first, then enclosing scopes.
        resolve(self.value, path)
            .cloned()
            .or_else(|| self.parent.and_then(|p| p.lookup(path)))
    }
}

fn resolve<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
        }
        other => out.push_str(&other.to_string()),
    }
}

fn render_nodes(nodes: &[Node], scope: &Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Value(path) => {
                if let Some(value) = scope.lookup(path) {
                    write_value(&value, out);
                }
            }
            Node::Each { path, body } => {
                let Some(Value::Array(items)) = scope.lookup(path) else {
                    continue;
                };
                let len = items.len();
                for (i, item) in items.iter().enumerate() {
                    let child = Scope {
                        value: item,
                        index: Some((i, len)),
                        parent: Some(scope),
                    };
                    render_nodes(body, &child, out);
                }
            }
            Node::Conditional {
                path,
                negate,
                then,
                otherwise,
            } => {
                let condition = truthy(scope.lookup(path).as_ref()) != *negate;
                let branch = if condition { then } else { otherwise };
                render_nodes(branch, scope, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, data: Value) -> String {
        PromptTemplate::compile("test", source).unwrap().render(&data)
    }

    fn compile_error(source: &str) -> TemplateErrorKind {
        PromptTemplate::compile("test", source).unwrap_err().kind
    }

    #[test]
    fn substitutes_double_and_triple_braces() {
        assert_eq!(
            render("{{a}} and {{{ b }}}", json!({"a": "x", "b": 2})),
            "x and 2"
        );
    }

    #[test]
    fn missing_values_render_empty() {
        assert_eq!(render("[{{missing}}]", json!({})), "[]");
        assert_eq!(render("[{{nothing}}]", json!({"nothing": null})), "[]");
    }

    #[test]
    fn lists_render_comma_joined() {
        assert_eq!(
            render("Languages: {{{languages}}}", json!({"languages": ["en", "hi"]})),
            "Languages: en,hi"
        );
    }

    #[test]
    fn dotted_paths_reach_nested_values() {
        let data = json!({"gradeAnalysis": {"gradeTrend": "improving", "scores": [70, 80]}});
        assert_eq!(
            render(
                "{{gradeAnalysis.gradeTrend}} {{gradeAnalysis.scores.1}}",
                data
            ),
            "improving 80"
        );
    }

    #[test]
    fn each_preserves_order_and_exposes_item_fields() {
        let data = json!({
            "unit": "%",
            "grades": [
                {"subject": "Math", "grade": 91},
                {"subject": "Art", "grade": 78}
            ]
        });
        assert_eq!(
            render(
                "{{#each grades}}{{@index}}:{{subject}}={{grade}}{{unit}};{{/each}}",
                data
            ),
            "0:Math=91%;1:Art=78%;"
        );
    }

    #[test]
    fn unless_last_separates_items() {
        let data = json!({"criteria": ["Clarity", "Grammar", "Evidence"]});
        assert_eq!(
            render(
                "{{#each criteria}}{{{this}}}{{#unless @last}}, {{/unless}}{{/each}}",
                data
            ),
            "Clarity, Grammar, Evidence"
        );
    }

    #[test]
    fn if_else_branches_on_truthiness() {
        let source = "{{#if extra}}Extra: {{extra}}{{else}}none{{/if}}";
        assert_eq!(render(source, json!({"extra": "Use pictures"})), "Extra: Use pictures");
        assert_eq!(render(source, json!({"extra": ""})), "none");
        assert_eq!(render(source, json!({})), "none");
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(render("a{{! note }}b", json!({})), "ab");
    }

    #[test]
    fn parent_scope_is_reachable() {
        let data = json!({"name": "outer", "items": [{"name": "inner"}]});
        assert_eq!(
            render("{{#each items}}{{name}}/{{../name}}{{/each}}", data),
            "inner/outer"
        );
    }

    #[test]
    fn malformed_templates_fail_to_compile() {
        assert_eq!(
            compile_error("{{#each items}}x"),
            TemplateErrorKind::UnclosedBlock("each".into())
        );
        assert_eq!(
            compile_error("{{#if a}}x{{/each}}"),
            TemplateErrorKind::MismatchedClose {
                expected: "if".into(),
                found: "each".into()
            }
        );
        assert_eq!(
            compile_error("x{{/if}}"),
            TemplateErrorKind::UnexpectedClose("if".into())
        );
        assert_eq!(compile_error("{{else}}"), TemplateErrorKind::StrayElse);
        assert_eq!(
            compile_error("{{#findLanguage lang}}{{/findLanguage}}"),
            TemplateErrorKind::UnknownHelper("findLanguage".into())
        );
        assert_eq!(compile_error("a {{ }}"), TemplateErrorKind::EmptyExpression(2));
    }

    #[test]
    fn text_without_tags_is_unchanged() {
        assert_eq!(render("plain { text }", json!({})), "plain { text }");
    }
}
