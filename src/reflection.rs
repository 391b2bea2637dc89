//! Reflection capability queried by the generator.
//!
//! The generator never depends on a concrete host framework. Everything it needs to know about a
//! handler (its documentation, the documentation of its controller and the types of its
//! parameters) is asked through the [`ParameterSourceResolver`] trait. The crate ships two
//! implementations: [`InMemoryResolver`], filled programmatically, and
//! [`crate::source::SourceReflector`], which reads a Rust project from disk.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// The handler a route dispatches to: a method on a type, or a free function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteAction {
    /// Controller type, `None` for free functions
    pub class: Option<String>,
    pub method: String,
}

impl RouteAction {
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            method: method.into(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self {
            class: None,
            method: name.into(),
        }
    }

    /// Parses `Type::method`, `Type@method` or a (possibly module-qualified) function name.
    ///
    /// In a `::` path the segment before the last names a controller type only when it starts
    /// with an uppercase letter; `handlers::list_users` is a free function.
    pub fn parse(action: &str) -> Result<Self> {
        let action = action.trim();

        if let Some((class, method)) = action.split_once('@') {
            if class.is_empty() || method.is_empty() {
                return Err(Error::InvalidAction(action.to_string()));
            }
            let class = class.rsplit("::").next().unwrap_or(class);
            return Ok(Self::method(class, method));
        }

        let segments: Vec<&str> = action.split("::").filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Err(Error::InvalidAction(action.to_string())),
            [.., owner, method] if owner.starts_with(|c: char| c.is_ascii_uppercase()) => {
                Ok(Self::method(*owner, *method))
            }
            [.., method] => Ok(Self::function(*method)),
        }
    }
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}::{}", class, self.method),
            None => write!(f, "{}", self.method),
        }
    }
}

/// Reflective access to handlers and the types they accept.
///
/// Implementations return `Err` when the target cannot be reflected at all; callers treat that
/// as a degraded case and continue.
pub trait ParameterSourceResolver {
    /// Raw documentation comment of the handler
    fn method_doc(&self, action: &RouteAction) -> Result<Option<String>>;

    /// Raw documentation comment of the handler's controller. For free functions this is the
    /// documentation of the enclosing module.
    fn controller_doc(&self, action: &RouteAction) -> Result<Option<String>>;

    /// Names of the handler's parameter types, outermost first (`Json<CreateUser>` yields
    /// `Json` then `CreateUser`)
    fn parameter_types(&self, action: &RouteAction) -> Result<Vec<String>>;

    /// Documentation comment of a structured-input type (a request payload type that carries
    /// its own parameter annotations). `Ok(None)` means the type exists but is not a structured
    /// input, or has no documentation.
    fn structured_input_doc(&self, type_name: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Default)]
struct HandlerEntry {
    doc: Option<String>,
    parameter_types: Vec<String>,
}

/// A [`ParameterSourceResolver`] backed by maps, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    handlers: HashMap<RouteAction, HandlerEntry>,
    controllers: HashMap<String, String>,
    inputs: HashMap<String, Option<String>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, action: RouteAction, doc: &str, parameter_types: &[&str]) -> Self {
        self.handlers.insert(
            action,
            HandlerEntry {
                doc: Some(doc.to_string()),
                parameter_types: parameter_types.iter().map(|t| t.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_controller(mut self, class: &str, doc: &str) -> Self {
        self.controllers.insert(class.to_string(), doc.to_string());
        self
    }

    /// Registers a structured-input type; `None` registers a known plain type
    pub fn with_input(mut self, type_name: &str, doc: Option<&str>) -> Self {
        self.inputs
            .insert(type_name.to_string(), doc.map(str::to_string));
        self
    }

    fn handler(&self, action: &RouteAction) -> Result<&HandlerEntry> {
        self.handlers
            .get(action)
            .ok_or_else(|| Error::reflection(action.to_string(), "unknown handler"))
    }
}

impl ParameterSourceResolver for InMemoryResolver {
    fn method_doc(&self, action: &RouteAction) -> Result<Option<String>> {
        Ok(self.handler(action)?.doc.clone())
    }

    fn controller_doc(&self, action: &RouteAction) -> Result<Option<String>> {
        Ok(action
            .class
            .as_ref()
            .and_then(|class| self.controllers.get(class))
            .cloned())
    }

    fn parameter_types(&self, action: &RouteAction) -> Result<Vec<String>> {
        Ok(self.handler(action)?.parameter_types.clone())
    }

    fn structured_input_doc(&self, type_name: &str) -> Result<Option<String>> {
        self.inputs
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::reflection(type_name, "unknown type"))
    }
}
