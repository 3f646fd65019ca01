//! Conditional GET support.
//!
//! The validator is a strong ETag: the quoted hex SHA-256 of the response body.
//! Matching follows `If-None-Match` semantics: a comma-separated list of
//! entity tags, weak (`W/`) prefixes ignored, `*` matching any body.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Outcome of evaluating a body against the client's validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalResponse {
    pub status: StatusCode,

    /// Empty when the client's copy is current
    pub body: Bytes,

    /// Validator for the body, sent in both cases
    pub etag: String,
}

/// Compute the ETag for a body.
pub fn compute_etag(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Whether an `If-None-Match` value matches the given ETag.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let etag = strip_weak(etag);
    if_none_match
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| candidate == "*" || strip_weak(candidate) == etag)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Pure function of (body, client validator) to (status, body, validator).
pub fn evaluate(body: Bytes, if_none_match: Option<&str>) -> ConditionalResponse {
    let etag = compute_etag(&body);
    match if_none_match {
        Some(validator) if etag_matches(validator, &etag) => ConditionalResponse {
            status: StatusCode::NOT_MODIFIED,
            body: Bytes::new(),
            etag,
        },
        _ => ConditionalResponse {
            status: StatusCode::OK,
            body,
            etag,
        },
    }
}

/// Evaluate using the request's `If-None-Match` header.
///
/// A header that is not valid visible ASCII is treated as absent.
pub fn evaluate_headers(body: Bytes, headers: &HeaderMap) -> ConditionalResponse {
    let validator = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    evaluate(body, validator)
}

impl ConditionalResponse {
    /// Convert into a response carrying `content_type` on full bodies.
    pub fn into_response_with_type(self, content_type: &'static str) -> Response {
        let mut response = if self.status == StatusCode::NOT_MODIFIED {
            (self.status, Body::empty()).into_response()
        } else {
            (
                self.status,
                [(header::CONTENT_TYPE, content_type)],
                Body::from(self.body),
            )
                .into_response()
        };

        if let Ok(value) = HeaderValue::from_str(&self.etag) {
            response.headers_mut().insert(header::ETAG, value);
        }
        response
    }
}
