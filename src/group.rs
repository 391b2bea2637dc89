//! Endpoint grouping and titles.

use crate::docblock::DocBlock;
use log::debug;

/// Group name, group description and title resolved for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    pub name: String,
    pub description: String,
    pub title: String,
}

/// Resolves the group of an endpoint.
///
/// A `@group` tag on the handler wins over one on the controller, and the configured default
/// group is used when neither exists. The first line of the tag content is the group name and
/// the remaining lines the group description.
///
/// Authors sometimes put the one-line summary after the group annotation instead of before it:
///
/// ```text
/// @group Cars
/// Fetch cars.
/// ```
///
/// so when the handler has no short description, the remaining lines of a handler-level tag are
/// the title and the group description is left empty.
pub fn resolve_group(
    method_doc: &DocBlock,
    controller_doc: Option<&DocBlock>,
    default_group: &str,
) -> RouteGroup {
    if let Some(tag) = method_doc.first_tag("group") {
        let (name, rest) = split_group(&tag.content);
        let rest = rest.trim().to_string();

        if method_doc.short_description.is_empty() {
            return RouteGroup {
                name,
                description: String::new(),
                title: rest,
            };
        }
        return RouteGroup {
            name,
            description: rest,
            title: method_doc.short_description.clone(),
        };
    }

    if let Some(tag) = controller_doc.and_then(|doc| doc.first_tag("group")) {
        let (name, description) = split_group(&tag.content);
        return RouteGroup {
            name,
            description,
            title: method_doc.short_description.clone(),
        };
    }

    debug!("No @group tag, using default group '{}'", default_group);
    RouteGroup {
        name: default_group.to_string(),
        description: String::new(),
        title: method_doc.short_description.clone(),
    }
}

fn split_group(content: &str) -> (String, String) {
    let content = content.trim();
    match content.split_once('\n') {
        Some((name, rest)) => (name.trim().to_string(), rest.to_string()),
        None => (content.to_string(), String::new()),
    }
}
