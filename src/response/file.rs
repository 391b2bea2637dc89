//! `@responseFile` tags.
//!
//! ```text
//! @responseFile [STATUS] PATH [JSON-OVERRIDES]
//! ```
//!
//! Paths are relative to the fixtures directory. Overrides are merged into the top-level JSON
//! object of the file and may be written with single quotes.

use super::{split_status, tags_named, RawResponse, ResponseStrategy, StrategyContext, CONTENT_TYPE_HEADER};
use crate::docblock::Tag;
use crate::route::Route;
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ResponseFileStrategy {
    fixtures_dir: PathBuf,
}

impl ResponseFileStrategy {
    pub fn new(fixtures_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixtures_dir: fixtures_dir.into(),
        }
    }

    fn load(&self, content: &str) -> Option<RawResponse> {
        let (status, rest) = split_status(content);
        let (path, overrides) = match rest.split_once(char::is_whitespace) {
            Some((path, overrides)) => (path, overrides.trim()),
            None => (rest, ""),
        };
        if path.is_empty() {
            warn!("@responseFile without a path");
            return None;
        }

        let full_path = self.fixtures_dir.join(path);
        let body = match fs::read_to_string(&full_path) {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping response file {}: {}", full_path.display(), e);
                return None;
            }
        };
        debug!("Loaded response file {}", full_path.display());

        let body = if overrides.is_empty() {
            body
        } else {
            merge_overrides(body, overrides)
        };

        Some(RawResponse::text(status, body).with_header(CONTENT_TYPE_HEADER, content_type(Path::new(path))))
    }
}

impl ResponseStrategy for ResponseFileStrategy {
    fn name(&self) -> &'static str {
        "response file"
    }

    fn attempt(&self, _route: &Route, tags: &[Tag], _context: &StrategyContext<'_>) -> Option<Vec<RawResponse>> {
        let responses: Vec<RawResponse> = tags_named(tags, &["responseFile"])
            .filter_map(|tag| self.load(&tag.content))
            .collect();

        (!responses.is_empty()).then_some(responses)
    }
}

/// Merges JSON overrides into a JSON object body. Bodies or overrides that are not JSON objects
/// leave the body untouched.
fn merge_overrides(body: String, overrides: &str) -> String {
    let extra = serde_json::from_str::<Value>(overrides)
        .or_else(|_| serde_json::from_str::<Value>(&requote(overrides)));

    let parsed = (serde_json::from_str::<Value>(&body), extra);
    match parsed {
        (Ok(Value::Object(mut base)), Ok(Value::Object(extra))) => {
            base.extend(extra);
            Value::Object(base).to_string()
        }
        _ => {
            warn!("Ignoring response file overrides that are not a JSON object: {}", overrides);
            body
        }
    }
}

/// Rewrites single-quoted strings as double-quoted JSON strings. `\'` inside a single-quoted
/// string is an apostrophe; double-quoted strings are copied as they are.
fn requote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '\'' | '"') => {
                quote = Some(c);
                out.push('"');
            }
            (Some(q), _) if c == q => {
                quote = None;
                out.push('"');
            }
            (Some('\''), '\\') => match chars.next() {
                Some('\'') => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            (Some('\''), '"') => out.push_str("\\\""),
            (Some(_), '\\') => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/json")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppliedRules;
    use crate::docblock::DocBlock;
    use crate::params::ParameterTable;
    use crate::response::ResponseRecord;
    use crate::route::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixtures() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("users")).unwrap();
        fs::write(
            dir.path().join("users/show.json"),
            r#"{"id": 4, "name": "Jessica", "active": true}"#,
        )
        .unwrap();
        fs::write(dir.path().join("greeting.txt"), "Hello").unwrap();
        dir
    }

    fn attempt(dir: &Path, doc: &str) -> Option<Vec<ResponseRecord>> {
        let route = Route::new("users/{id}", vec![HttpMethod::Get], "users");
        let rules = AppliedRules::default();
        let table = ParameterTable::new();
        let context = StrategyContext {
            rules: &rules,
            body: &table,
            query: &table,
        };

        ResponseFileStrategy::new(dir)
            .attempt(&route, &DocBlock::parse(doc).tags, &context)
            .map(|responses| responses.into_iter().map(ResponseRecord::from).collect())
    }

    #[test]
    fn test_load_file() {
        let dir = fixtures();
        let responses = attempt(dir.path(), "@responseFile users/show.json").unwrap();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status, 200);
        assert_eq!(responses[0].content, r#"{"id": 4, "name": "Jessica", "active": true}"#);
        assert_eq!(responses[0].content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_status_and_overrides() {
        let dir = fixtures();
        let responses =
            attempt(dir.path(), "@responseFile 201 users/show.json {'name': 'Jane', 'role': 'admin'}").unwrap();

        assert_eq!(responses[0].status, 201);
        let body: Value = serde_json::from_str(&responses[0].content).unwrap();
        assert_eq!(body, json!({"id": 4, "name": "Jane", "active": true, "role": "admin"}));
    }

    #[test]
    fn test_overrides_with_apostrophes() {
        let dir = fixtures();
        let responses = attempt(
            dir.path(),
            r#"@responseFile users/show.json {'name': 'O\'Brien', 'quote': 'say "hi"'}"#,
        )
        .unwrap();
        let body: Value = serde_json::from_str(&responses[0].content).unwrap();
        assert_eq!(body["name"], "O'Brien");
        assert_eq!(body["quote"], r#"say "hi""#);

        let responses = attempt(dir.path(), r#"@responseFile users/show.json {"name": "Jessica's"}"#).unwrap();
        let body: Value = serde_json::from_str(&responses[0].content).unwrap();
        assert_eq!(body["name"], "Jessica's");
    }

    #[test]
    fn test_requote() {
        assert_eq!(requote(r#"{'a': 'it\'s', "b": "x'y"}"#), r#"{"a": "it's", "b": "x'y"}"#);
        assert_eq!(requote(r#"{'a': 'line\n'}"#), r#"{"a": "line\n"}"#);
    }

    #[test]
    fn test_content_type_from_extension() {
        let dir = fixtures();
        let responses = attempt(dir.path(), "@responseFile greeting.txt").unwrap();

        assert_eq!(responses[0].content, "Hello");
        assert_eq!(responses[0].content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = fixtures();

        assert!(attempt(dir.path(), "@responseFile missing.json").is_none());

        let responses = attempt(dir.path(), "@responseFile missing.json\n@responseFile 404 greeting.txt").unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status, 404);
    }

    #[test]
    fn test_no_tags() {
        let dir = fixtures();
        assert!(attempt(dir.path(), "@response {}").is_none());
    }
}
