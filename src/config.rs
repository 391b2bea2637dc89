//! Configuration of a documentation run.
//!
//! The configuration file is YAML or JSON (chosen by file extension) and deserializes into
//! [`DocumentationConfig`]. Every field has a default, so an empty file is valid.
//!
//! ```yaml
//! default_group: general
//! faker_seed: 1234
//! fixtures_dir: fixtures
//! apply:
//!   headers:
//!     Authorization: Bearer {token}
//!   response_calls:
//!     methods: [GET]
//!     bindings:
//!       "{id}": 1
//! routes:
//!   - uri: users/{id}
//!     methods: [GET]
//!     action: UserController::show
//! ```

use crate::error::{Error, Result};
use crate::route::{HttpMethod, Route};
use anyhow::Context;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-route rules: headers to document and send, and values to bind into URIs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppliedRules {
    pub headers: IndexMap<String, String>,
    /// URI fragment (e.g. `{id}` or `users/{id}`) to value
    pub bindings: IndexMap<String, Value>,
    pub response_calls: ResponseCallRules,
}

impl AppliedRules {
    /// Bindings used for the documented URI: the top-level ones, else those of the response calls
    pub fn uri_bindings(&self) -> &IndexMap<String, Value> {
        if self.bindings.is_empty() {
            &self.response_calls.bindings
        } else {
            &self.bindings
        }
    }
}

/// Settings of the live-call response strategy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseCallRules {
    /// Methods for which a call is made; `*` allows all
    pub methods: Vec<String>,
    pub bindings: IndexMap<String, Value>,
    pub headers: IndexMap<String, String>,
    /// Query values merged over the documented query parameters
    pub query: Map<String, Value>,
    /// Body values merged over the documented body parameters
    pub body: Map<String, Value>,
    /// Environment overrides for the application while calling
    pub env: IndexMap<String, String>,
    /// Application configuration overrides while calling
    pub config: IndexMap<String, Value>,
}

impl ResponseCallRules {
    /// Whether a call should be made for a route answering to `methods`
    pub fn allows(&self, methods: &[HttpMethod]) -> bool {
        self.methods.iter().any(|allowed| {
            allowed.trim() == "*"
                || methods
                    .iter()
                    .any(|method| method.as_str().eq_ignore_ascii_case(allowed.trim()))
        })
    }
}

/// Settings of a documentation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// Group for endpoints without a `@group` tag
    pub default_group: String,
    /// Seed for example values; unset means random values on every run
    pub faker_seed: Option<u64>,
    /// Root for `@responseFile` and `@responseBinaryFile` paths, relative to the project
    pub fixtures_dir: PathBuf,
    /// Directory holding the handler sources, relative to the project
    pub source_dir: Option<PathBuf>,
    /// Directory names skipped when scanning sources
    pub exclude_dirs: Vec<String>,
    /// Rules applied to routes without their own `apply`
    pub apply: AppliedRules,
    pub routes: Vec<Route>,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            default_group: "general".to_string(),
            faker_seed: None,
            fixtures_dir: PathBuf::from("fixtures"),
            source_dir: None,
            exclude_dirs: vec!["target".to_string()],
            apply: AppliedRules::default(),
            routes: Vec::new(),
        }
    }
}

impl DocumentationConfig {
    /// Loads a configuration file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        debug!("Configuration lists {} route(s)", config.routes.len());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Fixtures directory resolved against the project root
    pub fn fixtures_root(&self, project: &Path) -> PathBuf {
        resolve(project, &self.fixtures_dir)
    }

    /// Source directory resolved against the project root
    pub fn sources_root(&self, project: &Path) -> PathBuf {
        match &self.source_dir {
            Some(dir) => resolve(project, dir),
            None => project.to_path_buf(),
        }
    }

    /// Rejects settings that cannot produce documentation at all. Problems with a single
    /// route are only logged; that route is still documented.
    pub fn validate(&self) -> Result<()> {
        if self.default_group.trim().is_empty() {
            return Err(Error::ConfigError("default_group must not be empty".to_string()));
        }
        for route in &self.routes {
            if route.methods().is_empty() {
                warn!("Route {} has no documentable methods", route.uri);
            }
        }
        Ok(())
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
