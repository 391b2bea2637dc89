//! Live calls against the application.
//!
//! When the applied rules allow it, the endpoint is called in-process through a [`Dispatcher`]
//! with example parameters, and whatever it answers is documented. Every call is bracketed by
//! [`Dispatcher::prepare`] and [`Dispatcher::finish`] so the host can apply environment
//! overrides and roll back data written during the call.

use super::{RawResponse, ResponseStrategy, StrategyContext};
use crate::docblock::Tag;
use crate::params::clean_params;
use crate::route::{bind_uri, HttpMethod, Route};
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{json, Map, Value};
use std::fmt;

/// A request built from the documented parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub headers: IndexMap<String, String>,
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The application failed while handling the request
    Fault(String),
    /// No call could be made at all
    Unavailable(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Fault(msg) => write!(f, "Application fault: {}", msg),
            DispatchError::Unavailable(msg) => write!(f, "Dispatcher unavailable: {}", msg),
        }
    }
}

impl std::error::Error for DispatchError {}

/// In-process request execution provided by the host application.
pub trait Dispatcher {
    /// Applies environment and configuration overrides before a call
    fn prepare(
        &self,
        env: &IndexMap<String, String>,
        config: &IndexMap<String, Value>,
    ) -> Result<(), DispatchError>;

    fn dispatch(&self, request: &FakeRequest) -> Result<RawResponse, DispatchError>;

    /// Undoes everything done since `prepare`; called after every attempt
    fn finish(&self);
}

pub struct ResponseCallStrategy {
    dispatcher: Option<Box<dyn Dispatcher>>,
}

impl ResponseCallStrategy {
    pub fn new(dispatcher: Option<Box<dyn Dispatcher>>) -> Self {
        Self { dispatcher }
    }
}

impl ResponseStrategy for ResponseCallStrategy {
    fn name(&self) -> &'static str {
        "response call"
    }

    fn attempt(&self, route: &Route, _tags: &[Tag], context: &StrategyContext<'_>) -> Option<Vec<RawResponse>> {
        let dispatcher = self.dispatcher.as_deref()?;
        let calls = &context.rules.response_calls;
        let methods = route.methods();
        if !calls.allows(&methods) {
            return None;
        }

        let request = build_request(route, &methods, context)?;
        debug!("Calling {} {}", request.method, request.uri);

        let outcome = dispatcher
            .prepare(&calls.env, &calls.config)
            .and_then(|_| dispatcher.dispatch(&request));
        dispatcher.finish();

        match outcome {
            Ok(response) => Some(vec![response]),
            Err(DispatchError::Fault(message)) => {
                warn!("Call to {} failed: {}", request.uri, message);
                Some(vec![RawResponse::json(500, json!({ "message": message }).to_string())])
            }
            Err(e @ DispatchError::Unavailable(_)) => {
                warn!("{}", e);
                None
            }
        }
    }
}

/// Builds the request for a route: first documented method, URI with the call bindings,
/// headers from the rules with the call headers on top, and the example parameters with the
/// configured query and body values merged in.
pub fn build_request(route: &Route, methods: &[HttpMethod], context: &StrategyContext<'_>) -> Option<FakeRequest> {
    let method = *methods.first()?;
    let calls = &context.rules.response_calls;

    let mut headers = context.rules.headers.clone();
    headers.extend(calls.headers.clone());

    let mut query = into_map(clean_params(context.query));
    query.extend(calls.query.clone());

    let mut body = into_map(clean_params(context.body));
    body.extend(calls.body.clone());

    Some(FakeRequest {
        method,
        uri: bind_uri(route.uri(), &calls.bindings),
        headers,
        query,
        body,
    })
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
