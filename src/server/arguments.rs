//! Request argument lookup.
//!
//! Arguments come from the query string and, for form bodies, from the body.
//! Both `application/x-www-form-urlencoded` and `multipart/form-data` bodies
//! are decoded; multipart parts that carry a filename are files, not
//! arguments, and are skipped. Body pairs are appended after query pairs and
//! the last value for a name wins, so a body argument overrides the query
//! argument of the same name. Values are returned verbatim.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::warn;
use url::form_urlencoded;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Decoded name/value pairs of a request, in arrival order.
///
/// Used as an extractor, it consumes the request body and must be the last
/// handler argument.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pairs: Vec<(String, String)>,
}

impl Arguments {
    /// Arguments from the query string only.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut args = Self::default();
        if let Some(query) = query {
            args.extend_from(query.as_bytes());
        }
        args
    }

    /// Query arguments followed by url-encoded body arguments.
    ///
    /// The body is only decoded when the request declares a form-encoded
    /// content type.
    pub fn from_form(query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut args = Self::from_query(query);
        if content_type_is(headers, FORM_URLENCODED) {
            args.extend_from(body);
        }
        args
    }

    /// Last value supplied for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn extend_from(&mut self, input: &[u8]) {
        self.pairs.extend(
            form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    /// Append the plain fields of a multipart body.
    ///
    /// A malformed body stops decoding; pairs read so far are kept.
    async fn extend_from_multipart(&mut self, mut multipart: Multipart) {
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => return,
                Err(err) => {
                    warn!(error = %err, "Malformed multipart arguments");
                    return;
                }
            };

            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.text().await {
                Ok(value) => self.pairs.push((name, value)),
                Err(err) => {
                    warn!(error = %err, field = %name, "Failed to read multipart argument");
                    return;
                }
            }
        }
    }
}

impl<S> FromRequest<S> for Arguments
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(str::to_string);
        let headers = req.headers();

        if content_type_is(headers, MULTIPART_FORM_DATA) {
            let mut args = Self::from_query(query.as_deref());
            match Multipart::from_request(req, state).await {
                Ok(multipart) => args.extend_from_multipart(multipart).await,
                Err(rejection) => {
                    warn!(reason = %rejection, "Ignoring undecodable multipart body");
                }
            }
            return Ok(args);
        }

        let is_form = content_type_is(headers, FORM_URLENCODED);
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut args = Self::from_query(query.as_deref());
        if is_form {
            args.extend_from(&body);
        }
        Ok(args)
    }
}

fn content_type_is(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
