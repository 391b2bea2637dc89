//! Parameter extraction from `@uriParam`, `@bodyParam` and `@queryParam` tags.
//!
//! Each tag kind has a small positional grammar:
//!
//! ```text
//! @uriParam   NAME TYPE DESCRIPTION?
//! @bodyParam  NAME TYPE [required] DESCRIPTION?
//! @queryParam NAME [required] DESCRIPTION?
//! ```
//!
//! Descriptions are free text. An `Example: <value>` suffix supplies an explicit example, cast to
//! the parameter type, and a `No-example` marker suppresses the synthesized one. Parameters
//! without an explicit example get a synthesized value from the [`ValueSynthesizer`].

use crate::docblock::{DocBlock, Tag};
use crate::literal::cast_to_type;
use crate::reflection::{ParameterSourceResolver, RouteAction};
use crate::types::{normalize_type, CanonicalType, ValueSynthesizer};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

/// A documented parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CanonicalType,
    pub description: String,
    pub required: bool,
    /// Example value; `None` when suppressed with `No-example`
    pub value: Option<Value>,
}

/// Parameters keyed by name, in order of first declaration.
pub type ParameterTable = IndexMap<String, ParameterSpec>;

/// Where a parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Uri,
    Body,
    Query,
}

impl ParameterKind {
    pub fn tag_name(self) -> &'static str {
        match self {
            ParameterKind::Uri => "uriParam",
            ParameterKind::Body => "bodyParam",
            ParameterKind::Query => "queryParam",
        }
    }
}

const NO_EXAMPLE: &str = "No-example";
const EXAMPLE: &str = "Example:";

/// Whitespace-separated words of a tag, with access to the untouched remainder.
struct Words<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Words<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = &self.text[self.pos..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    }

    fn next(&mut self) -> Option<&'a str> {
        let word = self.peek()?;
        self.pos += word.len();
        Some(word)
    }

    fn rest(&self) -> &'a str {
        self.text[self.pos..].trim()
    }
}

/// Extracts parameters of one kind for a handler.
///
/// When one of the handler's parameter types is a structured input with its own documentation,
/// the parameters declared there win over the handler's own tags, provided there is at least
/// one. Types that cannot be reflected are skipped.
pub fn extract_parameters(
    kind: ParameterKind,
    action: Option<&RouteAction>,
    resolver: &dyn ParameterSourceResolver,
    tags: &[Tag],
    synth: &mut ValueSynthesizer,
) -> ParameterTable {
    if let Some(action) = action {
        match resolver.parameter_types(action) {
            Ok(types) => {
                for type_name in types {
                    match resolver.structured_input_doc(&type_name) {
                        Ok(Some(raw)) => {
                            let doc = DocBlock::parse(&raw);
                            let table = extract_from_tags(kind, &doc.tags, synth);
                            if !table.is_empty() {
                                debug!(
                                    "Using {} parameters declared on {}",
                                    kind.tag_name(),
                                    type_name
                                );
                                return table;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => debug!("Skipping parameter type {}: {}", type_name, e),
                    }
                }
            }
            Err(e) => debug!("Cannot inspect parameters of {}: {}", action, e),
        }
    }

    extract_from_tags(kind, tags, synth)
}

/// Extracts parameters of one kind from a tag list. Later declarations of the same name
/// overwrite earlier ones but keep their position.
pub fn extract_from_tags(
    kind: ParameterKind,
    tags: &[Tag],
    synth: &mut ValueSynthesizer,
) -> ParameterTable {
    let mut table = ParameterTable::new();

    for tag in tags.iter().filter(|tag| tag.name == kind.tag_name()) {
        let Some(spec) = parse_parameter_tag(kind, tag, synth) else {
            warn!("Ignoring malformed @{} tag: {:?}", tag.name, tag.content);
            continue;
        };
        if table.contains_key(&spec.name) {
            debug!("@{} {} declared twice, last one wins", tag.name, spec.name);
        }
        table.insert(spec.name.clone(), spec);
    }

    table
}

fn parse_parameter_tag(
    kind: ParameterKind,
    tag: &Tag,
    synth: &mut ValueSynthesizer,
) -> Option<ParameterSpec> {
    let suppress_example = tag.content.contains(&format!(" {}", NO_EXAMPLE));
    let content = strip_no_example(&tag.content);
    let mut words = Words::new(&content);

    let name = words.next()?.to_string();
    let ty = match kind {
        ParameterKind::Query => CanonicalType::String,
        ParameterKind::Uri | ParameterKind::Body => normalize_type(words.next().unwrap_or("")),
    };

    let required = kind != ParameterKind::Uri && words.peek() == Some("required");
    if required {
        words.next();
    }

    let description = words.rest().replace(|c: char| c == '\n' || c == '\r', " ");
    let (description, example) = parse_description(description.trim(), &ty);

    let value = match example {
        Some(example) => Some(example),
        None if suppress_example => None,
        None if kind == ParameterKind::Query && mentions_counting(&description) => {
            Some(synth.synthesize(&CanonicalType::Integer))
        }
        None => Some(synth.synthesize(&ty)),
    };

    Some(ParameterSpec {
        name,
        ty,
        description,
        required,
        value,
    })
}

fn mentions_counting(description: &str) -> bool {
    let description = description.to_lowercase();
    ["number", "count", "page"]
        .iter()
        .any(|word| description.contains(word))
}

/// Removes every `No-example` marker together with the whitespace before it and a trailing
/// period.
fn strip_no_example(content: &str) -> String {
    let mut result = content.to_string();
    while let Some(index) = result.find(NO_EXAMPLE) {
        let start = match result[..index].chars().next_back() {
            Some(c) if c.is_whitespace() => index - c.len_utf8(),
            _ => index,
        };
        let mut end = index + NO_EXAMPLE.len();
        if result[end..].starts_with('.') {
            end += 1;
        }
        result.replace_range(start..end, "");
    }
    result
}

/// Splits an `Example: <value>` suffix off a description.
///
/// The last marker wins; it must start the description or follow whitespace. The example text
/// is cast to `ty`.
pub fn parse_description(description: &str, ty: &CanonicalType) -> (String, Option<Value>) {
    if let Some(index) = description.rfind(EXAMPLE) {
        let before = &description[..index];
        if before.is_empty() || before.ends_with(char::is_whitespace) {
            let example = description[index + EXAMPLE.len()..].trim();
            return (before.trim_end().to_string(), Some(cast_to_type(example, ty)));
        }
    }
    (description.to_string(), None)
}

/// Builds the nested example payload for a parameter table.
///
/// Parameters without a value are left out. Bracketed names (`user[name]`, `items[][id]`) are
/// read as dot paths, `*` segments become index `0`, and numeric segments build arrays. An index
/// past the end of an array appends to it.
pub fn clean_params(table: &ParameterTable) -> Value {
    let mut root = Value::Object(Map::new());

    for spec in table.values() {
        let Some(value) = spec.value.as_ref().filter(|v| !v.is_null()) else {
            continue;
        };
        let path = dotted_name(&spec.name);
        let segments: Vec<&str> = path.split('.').collect();
        set_path(&mut root, &segments, value.clone());
    }

    root
}

fn dotted_name(name: &str) -> String {
    let mut name = name.to_string();
    if name.contains('[') {
        name = name
            .replace("][", ".")
            .replace('[', ".")
            .replace(']', "")
            .replace("..", ".*.");
        if name.ends_with('.') {
            name.push('*');
        }
    }
    name.replace(".*", ".0")
}

fn set_path(target: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    let index = if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) {
        Some(head.parse::<usize>().unwrap_or(usize::MAX))
    } else {
        None
    };

    if index.is_none() && target.is_array() {
        if let Value::Array(items) = std::mem::take(target) {
            let map = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect();
            *target = Value::Object(map);
        }
    } else if !target.is_array() && !target.is_object() {
        *target = match index {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Object(Map::new()),
        };
    }

    match target {
        Value::Array(items) => {
            // indexes past the end append
            let index = match index {
                Some(index) if index < items.len() => index,
                _ => {
                    items.push(Value::Null);
                    items.len() - 1
                }
            };
            set_path(&mut items[index], rest, value);
        }
        Value::Object(map) => {
            let slot = map.entry(head.to_string()).or_insert(Value::Null);
            set_path(slot, rest, value);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::InMemoryResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tags(doc: &str) -> Vec<Tag> {
        DocBlock::parse(doc).tags
    }

    fn synth() -> ValueSynthesizer {
        ValueSynthesizer::new(Some(42))
    }

    #[test]
    fn test_uri_param_with_description() {
        let table = extract_from_tags(
            ParameterKind::Uri,
            &tags("@uriParam id int The user id."),
            &mut synth(),
        );

        let spec = &table["id"];
        assert_eq!(spec.ty, CanonicalType::Integer);
        assert_eq!(spec.description, "The user id.");
        assert!(!spec.required);
        assert!(spec.value.as_ref().unwrap().is_i64());
    }

    #[test]
    fn test_uri_param_two_token_form() {
        let table = extract_from_tags(ParameterKind::Uri, &tags("@uriParam slug string"), &mut synth());

        let spec = &table["slug"];
        assert_eq!(spec.ty, CanonicalType::String);
        assert_eq!(spec.description, "");
        assert!(!spec.required);
        assert!(spec.value.as_ref().unwrap().is_string());
    }

    #[test]
    fn test_uri_param_keeps_leading_required_word() {
        let table = extract_from_tags(
            ParameterKind::Uri,
            &tags("@uriParam id integer required for lookups. Example: 3"),
            &mut synth(),
        );

        let spec = &table["id"];
        assert!(!spec.required);
        assert_eq!(spec.description, "required for lookups.");
        assert_eq!(spec.value, Some(json!(3)));
    }

    #[test]
    fn test_uri_param_name_only_defaults_to_string() {
        let table = extract_from_tags(ParameterKind::Uri, &tags("@uriParam slug"), &mut synth());

        assert_eq!(table["slug"].ty, CanonicalType::String);
    }

    #[test]
    fn test_example_is_extracted_and_cast() {
        let table = extract_from_tags(
            ParameterKind::Uri,
            &tags("@uriParam id integer The user id. Example: 42"),
            &mut synth(),
        );

        assert_eq!(table["id"].description, "The user id.");
        assert_eq!(table["id"].value, Some(json!(42)));
    }

    #[test]
    fn test_example_for_array_type() {
        let table = extract_from_tags(
            ParameterKind::Body,
            &tags("@bodyParam ids integer[] required The ids. Example: [1, 2, 3]"),
            &mut synth(),
        );

        assert_eq!(table["ids"].ty.to_string(), "integer[]");
        assert_eq!(table["ids"].value, Some(json!([1, 2, 3])));
        assert!(table["ids"].required);
    }

    #[test]
    fn test_body_param_multiline_description() {
        let table = extract_from_tags(
            ParameterKind::Body,
            &tags("@bodyParam title string required The title\nof the post.\n@bodyParam draft bool"),
            &mut synth(),
        );

        assert_eq!(table["title"].description, "The title of the post.");
        assert!(table["title"].required);
        assert_eq!(table["draft"].ty, CanonicalType::Boolean);
        assert!(!table["draft"].required);
    }

    #[test]
    fn test_body_param_required_without_description() {
        let table = extract_from_tags(
            ParameterKind::Body,
            &tags("@bodyParam name string required"),
            &mut synth(),
        );

        assert!(table["name"].required);
        assert_eq!(table["name"].description, "");
    }

    #[test]
    fn test_no_example_suppresses_value() {
        let table = extract_from_tags(
            ParameterKind::Body,
            &tags("@bodyParam secret string The secret. No-example\n@bodyParam pin int The pin. No-example Example: 1234"),
            &mut synth(),
        );

        assert_eq!(table["secret"].value, None);
        assert_eq!(table["secret"].description, "The secret.");
        assert_eq!(table["pin"].value, Some(json!(1234)));
        assert_eq!(table["pin"].description, "The pin.");
    }

    #[test]
    fn test_query_param_counting_synthesizes_integer() {
        let table = extract_from_tags(
            ParameterKind::Query,
            &tags("@queryParam page Page number\n@queryParam sort The sort field."),
            &mut synth(),
        );

        assert_eq!(table["page"].ty, CanonicalType::String);
        assert!(table["page"].value.as_ref().unwrap().is_i64());
        assert!(table["sort"].value.as_ref().unwrap().is_string());
    }

    #[test]
    fn test_query_param_required_and_example() {
        let table = extract_from_tags(
            ParameterKind::Query,
            &tags("@queryParam status required Filter by status. Example: active"),
            &mut synth(),
        );

        let spec = &table["status"];
        assert!(spec.required);
        assert_eq!(spec.description, "Filter by status.");
        assert_eq!(spec.value, Some(json!("active")));
    }

    #[test]
    fn test_query_param_name_only() {
        let table = extract_from_tags(ParameterKind::Query, &tags("@queryParam q"), &mut synth());

        assert!(!table["q"].required);
        assert_eq!(table["q"].description, "");
    }

    #[test]
    fn test_duplicates_last_wins_first_position() {
        let table = extract_from_tags(
            ParameterKind::Body,
            &tags("@bodyParam a string First.\n@bodyParam b string\n@bodyParam a int Second."),
            &mut synth(),
        );

        let names: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table["a"].description, "Second.");
        assert_eq!(table["a"].ty, CanonicalType::Integer);
    }

    #[test]
    fn test_malformed_tag_is_skipped() {
        let table = extract_from_tags(
            ParameterKind::Body,
            &[Tag::new("bodyParam", ""), Tag::new("bodyParam", "ok string")],
            &mut synth(),
        );

        assert_eq!(table.len(), 1);
        assert!(table.contains_key("ok"));
    }

    #[test]
    fn test_other_tags_are_ignored() {
        let table = extract_from_tags(
            ParameterKind::Query,
            &tags("@bodyParam a string\n@uriParam b int"),
            &mut synth(),
        );

        assert!(table.is_empty());
    }

    #[test]
    fn test_seeded_extraction_is_idempotent() {
        let doc = "@bodyParam a int\n@bodyParam b string\n@bodyParam c float\n@bodyParam d bool";
        let first = extract_from_tags(ParameterKind::Body, &tags(doc), &mut ValueSynthesizer::new(Some(9)));
        let second = extract_from_tags(ParameterKind::Body, &tags(doc), &mut ValueSynthesizer::new(Some(9)));

        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_description_edge_cases() {
        let (text, example) = parse_description("No marker here", &CanonicalType::String);
        assert_eq!(text, "No marker here");
        assert_eq!(example, None);

        let (text, example) = parse_description("Example: true", &CanonicalType::Boolean);
        assert_eq!(text, "");
        assert_eq!(example, Some(json!(true)));

        let (text, example) = parse_description("See Example: a Example: b", &CanonicalType::String);
        assert_eq!(text, "See Example: a");
        assert_eq!(example, Some(json!("b")));

        let (_, example) = parse_description("Flag. Example: false", &CanonicalType::Boolean);
        assert_eq!(example, Some(json!(false)));
    }

    #[test]
    fn test_structured_input_takes_precedence() {
        let action = RouteAction::method("UserController", "store");
        let resolver = InMemoryResolver::new()
            .with_handler(action.clone(), "", &["Json", "Missing", "StoreUser"])
            .with_input("Json", None)
            .with_input("StoreUser", Some("@bodyParam email string required"));

        let table = extract_parameters(
            ParameterKind::Body,
            Some(&action),
            &resolver,
            &tags("@bodyParam name string"),
            &mut synth(),
        );

        let names: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["email"]);
    }

    #[test]
    fn test_empty_structured_input_falls_back_to_method_tags() {
        let action = RouteAction::method("UserController", "store");
        let resolver = InMemoryResolver::new()
            .with_handler(action.clone(), "", &["StoreUser"])
            .with_input("StoreUser", Some("@queryParam unrelated"));

        let table = extract_parameters(
            ParameterKind::Body,
            Some(&action),
            &resolver,
            &tags("@bodyParam name string"),
            &mut synth(),
        );

        assert!(table.contains_key("name"));
    }

    #[test]
    fn test_unknown_handler_falls_back_to_method_tags() {
        let resolver = InMemoryResolver::new();
        let table = extract_parameters(
            ParameterKind::Uri,
            Some(&RouteAction::function("gone")),
            &resolver,
            &tags("@uriParam id int"),
            &mut synth(),
        );

        assert!(table.contains_key("id"));
    }

    fn spec(name: &str, value: Option<Value>) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            ty: CanonicalType::String,
            description: String::new(),
            required: false,
            value,
        }
    }

    #[test]
    fn test_clean_params() {
        let mut table = ParameterTable::new();
        for spec in [
            spec("title", Some(json!("Hello"))),
            spec("secret", None),
            spec("user[name]", Some(json!("Jane"))),
            spec("user.age", Some(json!(30))),
            spec("items[][id]", Some(json!(7))),
            spec("tags.*", Some(json!("rust"))),
        ] {
            table.insert(spec.name.clone(), spec);
        }

        assert_eq!(
            clean_params(&table),
            json!({
                "title": "Hello",
                "user": {"name": "Jane", "age": 30},
                "items": [{"id": 7}],
                "tags": ["rust"]
            })
        );
    }

    #[test]
    fn test_clean_params_large_indexes_append() {
        let mut table = ParameterTable::new();
        for spec in [
            spec("items.18446744073709551615", Some(json!("a"))),
            spec("ids[50000000]", Some(json!(1))),
            spec("ids[99999999999999999999]", Some(json!(2))),
            spec("ids.0", Some(json!(3))),
        ] {
            table.insert(spec.name.clone(), spec);
        }

        assert_eq!(
            clean_params(&table),
            json!({
                "items": ["a"],
                "ids": [3, 2]
            })
        );
    }

    #[test]
    fn test_dotted_name() {
        assert_eq!(dotted_name("user[name]"), "user.name");
        assert_eq!(dotted_name("items[][id]"), "items.0.id");
        assert_eq!(dotted_name("a.*.b"), "a.0.b");
        assert_eq!(dotted_name("plain"), "plain");
        assert_eq!(dotted_name("tags[]"), "tags.0");
    }
}
