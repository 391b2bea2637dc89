//! Writing extracted documentation as YAML or JSON.
//!
//! The output document is the list of endpoint groups produced by
//! [`crate::generator::group_endpoints`], wrapped in a [`Documentation`] value so downstream
//! templates have a stable top-level key.

use crate::generator::EndpointGroup;
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Top-level output document.
#[derive(Debug, Clone, Serialize)]
pub struct Documentation {
    pub groups: Vec<EndpointGroup>,
}

impl Documentation {
    pub fn new(groups: Vec<EndpointGroup>) -> Self {
        Self { groups }
    }

    pub fn endpoint_count(&self) -> usize {
        self.groups.iter().map(|group| group.endpoints.len()).sum()
    }
}

/// Serializes documentation to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &Documentation) -> Result<String> {
    debug!("Serializing {} group(s) to YAML", doc.groups.len());
    serde_yaml::to_string(doc).context("Failed to serialize documentation to YAML")
}

/// Serializes documentation to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &Documentation) -> Result<String> {
    debug!("Serializing {} group(s) to JSON", doc.groups.len());
    serde_json::to_string_pretty(doc).context("Failed to serialize documentation to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - The file path to write to
///
/// # Errors
///
/// Returns an error if a directory cannot be created or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppliedRules, DocumentationConfig};
    use crate::generator::{group_endpoints, Generator};
    use crate::reflection::{InMemoryResolver, RouteAction};
    use crate::response::ResponseResolver;
    use crate::route::{HttpMethod, Route};
    use serde_json::Value;
    use tempfile::TempDir;

    fn create_test_documentation() -> Documentation {
        let resolver = InMemoryResolver::new()
            .with_handler(
                RouteAction::function("list_cars"),
                "List cars.\n@group Cars\nEverything about cars.\n@queryParam color Paint color. Example: red\n@response [{\"id\": 1}]",
                &[],
            )
            .with_handler(RouteAction::function("health"), "Health check.", &[]);
        let config = DocumentationConfig {
            faker_seed: Some(9),
            ..DocumentationConfig::default()
        };
        let generator = Generator::new(&config, &resolver, ResponseResolver::standard("fixtures", None, None));

        let routes = [
            Route::new("cars", vec![HttpMethod::Get], "list_cars"),
            Route::new("health", vec![HttpMethod::Get], "health"),
        ];
        let endpoints = routes
            .iter()
            .map(|route| generator.process_route(route, &AppliedRules::default()))
            .collect();
        Documentation::new(group_endpoints(endpoints))
    }

    #[test]
    fn test_serialize_yaml() {
        let doc = create_test_documentation();
        let yaml = serialize_yaml(&doc).unwrap();

        assert!(yaml.contains("groups:"));
        assert!(yaml.contains("name: Cars"));
        assert!(yaml.contains("description: Everything about cars."));
        assert!(yaml.contains("groupName: general"));
        assert!(yaml.contains("showResponse: true"));

        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["groups"][0]["endpoints"][0]["queryParameters"]["color"]["value"], "red");
    }

    #[test]
    fn test_serialize_json() {
        let doc = create_test_documentation();
        let json = serialize_json(&doc).unwrap();

        assert!(json.contains('\n'));
        let parsed: Value = serde_json::from_str(&json).unwrap();
        let endpoint = &parsed["groups"][0]["endpoints"][0];
        assert_eq!(endpoint["uri"], "cars");
        assert_eq!(endpoint["methods"][0], "GET");
        assert_eq!(endpoint["responses"][0]["content"], "[{\"id\": 1}]");
        assert_eq!(endpoint["cleanQueryParameters"]["color"], "red");
        assert_eq!(parsed["groups"][1]["name"], "general");
    }

    #[test]
    fn test_endpoint_count() {
        let doc = create_test_documentation();
        assert_eq!(doc.groups.len(), 2);
        assert_eq!(doc.endpoint_count(), 2);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("docs").join("endpoints.yaml");

        write_to_file("groups: []", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "groups: []");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("endpoints.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("{}", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }
}
