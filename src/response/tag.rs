//! `@response` tags.
//!
//! ```text
//! @response [STATUS] [comment="..."] [MIME] BODY
//! ```

use super::{split_status, tags_named, RawResponse, ResponseStrategy, StrategyContext, COMMENT_HEADER, CONTENT_TYPE_HEADER};
use crate::docblock::Tag;
use crate::route::Route;

const COMMENT_PREFIX: &str = "comment=\"";

/// Responses written out in the doc comment. Each `@response` tag is one response.
pub struct ResponseTagStrategy;

impl ResponseStrategy for ResponseTagStrategy {
    fn name(&self) -> &'static str {
        "response tag"
    }

    fn attempt(&self, _route: &Route, tags: &[Tag], _context: &StrategyContext<'_>) -> Option<Vec<RawResponse>> {
        let responses: Vec<RawResponse> = tags_named(tags, &["response"])
            .map(|tag| parse_response_tag(&tag.content))
            .collect();

        (!responses.is_empty()).then_some(responses)
    }
}

fn parse_response_tag(content: &str) -> RawResponse {
    let (status, mut rest) = split_status(content);

    let mut comment = None;
    if let Some(after) = rest.strip_prefix(COMMENT_PREFIX) {
        if let Some(end) = after.find('"') {
            comment = Some(after[..end].to_string());
            rest = after[end + 1..].trim_start();
        }
    }

    let mut content_type = "application/json";
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    if is_mime(&rest[..end]) {
        content_type = &rest[..end];
        rest = rest[end..].trim_start();
    }

    let body = match rest.trim() {
        "" => "{}",
        body => body,
    };

    let mut response = RawResponse::text(status, body).with_header(CONTENT_TYPE_HEADER, content_type);
    if let Some(comment) = comment {
        response = response.with_header(COMMENT_HEADER, comment);
    }
    response
}

fn is_mime(word: &str) -> bool {
    match word.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && kind.chars().all(|c| c.is_ascii_alphabetic())
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        }
        None => false,
    }
}
