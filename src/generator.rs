//! Endpoint descriptor assembly.
//!
//! The [`Generator`] turns each route into an [`EndpointDescriptor`]: it reads the handler's doc
//! comment through the injected [`ParameterSourceResolver`], resolves the group and title,
//! extracts the three parameter tables, runs the response pipeline and derives the remaining
//! flags. Descriptors are then grouped for the templating layer with [`group_endpoints`].

use crate::config::{AppliedRules, DocumentationConfig};
use crate::docblock::DocBlock;
use crate::group::resolve_group;
use crate::params::{clean_params, extract_parameters, ParameterKind, ParameterTable};
use crate::reflection::{ParameterSourceResolver, RouteAction};
use crate::response::{ResponseRecord, ResponseResolver, StrategyContext};
use crate::route::{bind_uri, HttpMethod, Route};
use crate::types::ValueSynthesizer;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Separates the long description from the footer text shown after the endpoint
pub const FOOTER_MARKER: &str = "#@footer@#";

/// Everything documented about one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// Hex SHA-256 of the URI and methods
    pub id: String,
    pub group_name: String,
    pub group_description: String,
    pub title: String,
    pub description: String,
    pub footer_description: String,
    pub methods: Vec<HttpMethod>,
    pub uri: String,
    /// URI with the configured bindings substituted
    pub bound_uri: String,
    pub uri_parameters: ParameterTable,
    pub body_parameters: ParameterTable,
    pub query_parameters: ParameterTable,
    pub clean_uri_parameters: Value,
    pub clean_body_parameters: Value,
    pub clean_query_parameters: Value,
    pub authenticated: bool,
    pub responses: Vec<ResponseRecord>,
    pub show_response: bool,
    pub headers: IndexMap<String, String>,
}

/// Endpoints sharing a group name, in the order they were first seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointGroup {
    pub name: String,
    pub description: String,
    pub endpoints: Vec<EndpointDescriptor>,
}

pub struct Generator<'a> {
    default_group: String,
    faker_seed: Option<u64>,
    default_rules: AppliedRules,
    resolver: &'a dyn ParameterSourceResolver,
    responses: ResponseResolver,
}

impl<'a> Generator<'a> {
    pub fn new(
        config: &DocumentationConfig,
        resolver: &'a dyn ParameterSourceResolver,
        responses: ResponseResolver,
    ) -> Self {
        Self {
            default_group: config.default_group.clone(),
            faker_seed: config.faker_seed,
            default_rules: config.apply.clone(),
            resolver,
            responses,
        }
    }

    /// Processes every route with its own rules, or the default rules when it has none.
    pub fn process_routes(&self, routes: &[Route]) -> Vec<EndpointDescriptor> {
        let total = routes.len();
        routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                info!("Processing route {}/{}: {}", index + 1, total, route.uri());
                let rules = route.apply.as_ref().unwrap_or(&self.default_rules);
                self.process_route(route, rules)
            })
            .collect()
    }

    /// Builds the descriptor of one route.
    ///
    /// # Arguments
    ///
    /// * `route` - The route to document
    /// * `rules` - Headers, bindings and live-call settings for this route
    ///
    /// # Returns
    ///
    /// The descriptor. Handlers that cannot be reflected are documented from an empty doc
    /// comment rather than failing the run.
    pub fn process_route(&self, route: &Route, rules: &AppliedRules) -> EndpointDescriptor {
        let action = match route.action() {
            Ok(action) => Some(action),
            Err(e) => {
                warn!("{}: {}", route.uri(), e);
                None
            }
        };

        let method_doc = action
            .as_ref()
            .map(|action| self.method_doc(action))
            .unwrap_or_default();
        let controller_doc = action.as_ref().and_then(|action| self.controller_doc(action));

        let group = resolve_group(&method_doc, controller_doc.as_ref(), &self.default_group);
        let title = if group.title.is_empty() {
            method_doc.short_description.clone()
        } else {
            group.title
        };
        let (description, footer_description) = split_footer(&method_doc.long_description);

        let mut synth = ValueSynthesizer::new(self.faker_seed);
        let tags = &method_doc.tags;
        let uri_parameters =
            extract_parameters(ParameterKind::Uri, action.as_ref(), self.resolver, tags, &mut synth);
        let body_parameters =
            extract_parameters(ParameterKind::Body, action.as_ref(), self.resolver, tags, &mut synth);
        let query_parameters =
            extract_parameters(ParameterKind::Query, action.as_ref(), self.resolver, tags, &mut synth);

        let context = StrategyContext {
            rules,
            body: &body_parameters,
            query: &query_parameters,
        };
        let responses = self.responses.resolve(route, tags, &context);

        let methods = route.methods();
        let authenticated = tags.iter().any(|tag| tag.is("authenticated"));

        EndpointDescriptor {
            id: endpoint_id(route.uri(), &methods),
            group_name: group.name,
            group_description: group.description,
            title,
            description,
            footer_description,
            bound_uri: bind_uri(route.uri(), rules.uri_bindings()),
            uri: route.uri().to_string(),
            methods,
            clean_uri_parameters: clean_params(&uri_parameters),
            clean_body_parameters: clean_params(&body_parameters),
            clean_query_parameters: clean_params(&query_parameters),
            uri_parameters,
            body_parameters,
            query_parameters,
            authenticated,
            show_response: !responses.is_empty(),
            responses,
            headers: rules.headers.clone(),
        }
    }

    fn method_doc(&self, action: &RouteAction) -> DocBlock {
        match self.resolver.method_doc(action) {
            Ok(Some(raw)) => {
                let doc = DocBlock::parse(&raw);
                if doc.is_empty() {
                    debug!("{} has an empty doc comment", action);
                }
                doc
            }
            Ok(None) => {
                debug!("{} has no doc comment", action);
                DocBlock::default()
            }
            Err(e) => {
                warn!("{}", e);
                DocBlock::default()
            }
        }
    }

    fn controller_doc(&self, action: &RouteAction) -> Option<DocBlock> {
        match self.resolver.controller_doc(action) {
            Ok(raw) => raw.map(|raw| DocBlock::parse(&raw)),
            Err(e) => {
                debug!("No controller doc for {}: {}", action, e);
                None
            }
        }
    }
}

/// Groups descriptors by group name in first-seen order. A group's description is the first
/// non-empty description among its endpoints.
pub fn group_endpoints(descriptors: Vec<EndpointDescriptor>) -> Vec<EndpointGroup> {
    let mut groups: IndexMap<String, EndpointGroup> = IndexMap::new();

    for descriptor in descriptors {
        let group = groups
            .entry(descriptor.group_name.clone())
            .or_insert_with(|| EndpointGroup {
                name: descriptor.group_name.clone(),
                description: String::new(),
                endpoints: Vec::new(),
            });
        if group.description.is_empty() {
            group.description = descriptor.group_description.clone();
        }
        group.endpoints.push(descriptor);
    }

    groups.into_values().collect()
}

fn endpoint_id(uri: &str, methods: &[HttpMethod]) -> String {
    let methods: String = methods.iter().map(HttpMethod::as_str).collect();
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", uri, methods).as_bytes());
    format!("{:x}", hasher.finalize())
}

fn split_footer(long_description: &str) -> (String, String) {
    match long_description.split_once(FOOTER_MARKER) {
        Some((description, footer)) => (description.trim().to_string(), footer.trim().to_string()),
        None => (long_description.to_string(), String::new()),
    }
}
