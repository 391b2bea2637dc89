//! Response resolution pipeline.
//!
//! A [`ResponseResolver`] holds an ordered list of [`ResponseStrategy`] values. For each endpoint
//! the strategies are tried in order and the first one that matches supplies the documented
//! responses; the rest are never consulted. A strategy matches by returning `Some`, even with an
//! empty list, and declines with `None`.
//!
//! The standard order is:
//!
//! 1. [`tag::ResponseTagStrategy`] (`@response`)
//! 2. [`transformer::TransformerStrategy`] (`@transformer`, `@transformerCollection`)
//! 3. [`file::ResponseFileStrategy`] (`@responseFile`)
//! 4. [`call::ResponseCallStrategy`] (live call through a [`call::Dispatcher`])
//! 5. [`binary::BinaryFileStrategy`] (`@responseBinaryFile`, `@responsePdfFile`)

pub mod binary;
pub mod call;
pub mod file;
pub mod tag;
pub mod transformer;

use crate::config::AppliedRules;
use crate::docblock::Tag;
use crate::params::ParameterTable;
use crate::route::Route;
use base64::{engine::general_purpose::STANDARD, Engine};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::path::PathBuf;

use self::binary::BinaryFileStrategy;
use self::call::{Dispatcher, ResponseCallStrategy};
use self::file::ResponseFileStrategy;
use self::tag::ResponseTagStrategy;
use self::transformer::{TransformerRegistry, TransformerStrategy};

/// Header carrying the human-readable comment of an example response
pub const COMMENT_HEADER: &str = "comment";
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// Response body as produced by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Binary(Vec<u8>),
}

/// A response as produced by a strategy, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Body,
    pub headers: IndexMap<String, String>,
}

impl RawResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Body::Text(body.into()),
            headers: IndexMap::new(),
        }
    }

    pub fn binary(status: u16, bytes: Vec<u8>) -> Self {
        Self {
            status,
            body: Body::Binary(bytes),
            headers: IndexMap::new(),
        }
    }

    /// A text response with an `application/json` content type
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::text(status, body).with_header(CONTENT_TYPE_HEADER, "application/json")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header value, with the name compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A documented example response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    /// Body text; binary bodies are base64-encoded
    pub content: String,
    pub content_type: Option<String>,
    pub comment: Option<String>,
}

impl From<RawResponse> for ResponseRecord {
    fn from(raw: RawResponse) -> Self {
        let content_type = raw.header(CONTENT_TYPE_HEADER).map(str::to_string);
        let comment = raw.header(COMMENT_HEADER).map(str::to_string);
        let content = match raw.body {
            Body::Text(text) => text,
            Body::Binary(bytes) => STANDARD.encode(bytes),
        };

        Self {
            status: raw.status,
            content,
            content_type,
            comment,
        }
    }
}

/// What a strategy may look at besides the route and its tags.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub rules: &'a AppliedRules,
    pub body: &'a ParameterTable,
    pub query: &'a ParameterTable,
}

/// One way of finding example responses for an endpoint.
pub trait ResponseStrategy {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Returns `None` when the strategy does not apply to the endpoint.
    fn attempt(
        &self,
        route: &Route,
        tags: &[Tag],
        context: &StrategyContext<'_>,
    ) -> Option<Vec<RawResponse>>;
}

/// Tries strategies in order until one matches.
pub struct ResponseResolver {
    strategies: Vec<Box<dyn ResponseStrategy>>,
}

impl ResponseResolver {
    pub fn new(strategies: Vec<Box<dyn ResponseStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard strategy chain.
    ///
    /// # Arguments
    ///
    /// * `fixtures_dir` - Root for `@responseFile` and `@responseBinaryFile` paths
    /// * `transformers` - Transformer collaborator; without it `@transformer` tags are ignored
    /// * `dispatcher` - Fake-request collaborator; without it no live calls are made
    pub fn standard(
        fixtures_dir: impl Into<PathBuf>,
        transformers: Option<Box<dyn TransformerRegistry>>,
        dispatcher: Option<Box<dyn Dispatcher>>,
    ) -> Self {
        let fixtures_dir = fixtures_dir.into();
        Self::new(vec![
            Box::new(ResponseTagStrategy),
            Box::new(TransformerStrategy::new(transformers)),
            Box::new(ResponseFileStrategy::new(fixtures_dir.clone())),
            Box::new(ResponseCallStrategy::new(dispatcher)),
            Box::new(BinaryFileStrategy::new(fixtures_dir)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Responses of the first matching strategy, or none at all
    pub fn resolve(
        &self,
        route: &Route,
        tags: &[Tag],
        context: &StrategyContext<'_>,
    ) -> Vec<ResponseRecord> {
        for strategy in &self.strategies {
            if let Some(responses) = strategy.attempt(route, tags, context) {
                debug!(
                    "{} response(s) for {} from {}",
                    responses.len(),
                    route.uri(),
                    strategy.name()
                );
                return responses.into_iter().map(ResponseRecord::from).collect();
            }
        }

        debug!("No response strategy matched {}", route.uri());
        Vec::new()
    }
}

/// Tags with exactly the given name
pub(crate) fn tags_named<'a>(tags: &'a [Tag], names: &'a [&'a str]) -> impl Iterator<Item = &'a Tag> {
    tags.iter().filter(move |tag| names.contains(&tag.name.as_str()))
}

/// Splits an optional leading three-digit status code off tag content; defaults to 200.
pub(crate) fn split_status(content: &str) -> (u16, &str) {
    let content = content.trim();
    let end = content.find(char::is_whitespace).unwrap_or(content.len());
    let word = &content[..end];

    if word.len() == 3 && word.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(status) = word.parse() {
            return (status, content[end..].trim_start());
        }
    }
    (200, content)
}
