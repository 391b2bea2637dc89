//! Route descriptors handed to the generator.
//!
//! Route discovery happens outside this crate; routes arrive as plain [`Route`] values, usually
//! deserialized from the `routes` list of the configuration file.

use crate::config::AppliedRules;
use crate::error::{Error, Result};
use crate::reflection::RouteAction;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(method: &str) -> Result<Self> {
        match method.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(Error::ConfigError(format!("unknown HTTP method: {}", other))),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = Error;

    fn try_from(method: String) -> Result<Self> {
        method.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// A route to document.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    /// URI pattern, e.g. `users/{id}`
    pub uri: String,
    pub methods: Vec<HttpMethod>,
    /// Handler reference: `Type::method`, `Type@method` or a function name
    pub action: String,
    /// Rules for this route, replacing the configuration defaults
    #[serde(default)]
    pub apply: Option<AppliedRules>,
}

impl Route {
    pub fn new(uri: impl Into<String>, methods: Vec<HttpMethod>, action: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            methods,
            action: action.into(),
            apply: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Documented methods: HEAD is left out and duplicates removed, order kept
    pub fn methods(&self) -> Vec<HttpMethod> {
        let mut methods = Vec::new();
        for method in &self.methods {
            if *method != HttpMethod::Head && !methods.contains(method) {
                methods.push(*method);
            }
        }
        methods
    }

    pub fn action(&self) -> Result<RouteAction> {
        RouteAction::parse(&self.action)
    }
}

/// Substitutes route parameter bindings into a URI.
///
/// Binding keys are URI fragments containing one placeholder, such as `{id}` or `users/{id}`,
/// so the same parameter name can be bound differently per resource. When the URI contains the
/// fragment, the fragment's placeholder is replaced by the bound value everywhere in the URI.
/// Optional placeholders (`{name?}`) left unbound are removed.
pub fn bind_uri(uri: &str, bindings: &IndexMap<String, Value>) -> String {
    let mut bound = uri.to_string();

    for (pattern, value) in bindings {
        if !bound.contains(pattern.as_str()) {
            continue;
        }
        if let Some(placeholder) = first_placeholder(pattern) {
            bound = bound.replace(placeholder, &binding_text(value));
        }
    }

    strip_optional_placeholders(&bound)
}

fn first_placeholder(pattern: &str) -> Option<&str> {
    let start = pattern.find('{')?;
    let end = start + pattern[start..].find('}')?;
    Some(&pattern[start..=end])
}

fn strip_optional_placeholders(uri: &str) -> String {
    let mut result = String::with_capacity(uri.len());
    let mut rest = uri;

    while let Some(start) = rest.find('{') {
        match rest[start..].find('}') {
            Some(len) if rest[start..start + len].ends_with('?') => {
                result.push_str(&rest[..start]);
                rest = &rest[start + len + 1..];
            }
            Some(len) => {
                result.push_str(&rest[..=start + len]);
                rest = &rest[start + len + 1..];
            }
            None => break,
        }
    }
    result.push_str(rest);
    result
}

/// Text form of a binding value; strings are used verbatim
pub fn binding_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
