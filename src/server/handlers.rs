//! HTTP request handlers for the session gate service.
//!
//! # Endpoints
//!
//! - `GET /` - Current user (empty when anonymous)
//! - `POST /auth` - Log in
//! - `GET /auth` - Greet a logged-in user
//! - `DELETE /auth` - Log out
//! - `GET /forbidden` - Protected resource
//! - `GET|POST /searchlike` - Echo the `q` argument
//! - `POST /file` - Accept a markdown upload
//! - `GET /static` - Fixed document with ETag caching
//! - `GET /health` - Health check

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        FromRef, RawQuery, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::arguments::Arguments;
use super::conditional;
use crate::error::{AuthError, UploadError};
use crate::session::{CurrentUser, SessionGate};

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// The only content type `/file` accepts.
pub const ACCEPTED_UPLOAD_TYPE: &str = "text/markdown";

/// Content type assumed for file parts that declare none.
pub const DEFAULT_UPLOAD_TYPE: &str = "application/unknown";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gate: SessionGate,
}

impl AppState {
    pub fn new(gate: SessionGate) -> Self {
        Self { gate }
    }
}

impl FromRef<AppState> for SessionGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    /// Current username, empty when anonymous
    pub user: String,
}

/// `POST /auth` success.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /auth` success.
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub meta: WelcomeMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeMeta {
    pub user: String,
}

/// `GET /forbidden` success.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: String,
}

/// `GET|POST /searchlike`
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Serialized as `null` when absent
    pub q: Option<String>,
}

/// `POST /file` success.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub name: String,
}

/// Document served by `GET /static`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StaticResponse {
    pub resource: String,
    pub revision: u32,
}

impl Default for StaticResponse {
    fn default() -> Self {
        Self {
            resource: "static".to_string(),
            revision: 1,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Error returned by handlers: a status plus an optional JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Option<ErrorResponse>,
}

impl ApiError {
    /// Answer with a different status, keeping the body.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Some(ErrorResponse::with_message("internal", message)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let body = match &err {
            AuthError::InvalidCredentials => {
                Some(ErrorResponse::with_message("invalid credentials", "not ok"))
            }
            AuthError::Unauthorized => {
                Some(ErrorResponse::with_message("unauthorized", "login first"))
            }
            AuthError::Forbidden => None,
        };
        Self {
            status: err.status(),
            body,
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        let status = err.status();
        let body = match err {
            UploadError::MissingUpload => ErrorResponse::new(UPLOAD_FIELD),
            UploadError::UnsupportedMediaType { content_type } => ErrorResponse::new(content_type),
        };
        Self {
            status,
            body: Some(body),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_type = self.body.as_ref().map(|b| b.error.as_str()).unwrap_or("");
        if self.status.is_server_error() {
            error!(
                error_type = error_type,
                status = self.status.as_u16(),
                "Server error"
            );
        } else {
            debug!(
                error_type = error_type,
                status = self.status.as_u16(),
                "Client error"
            );
        }

        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

// =============================================================================
// Upload Handling
// =============================================================================

/// A file received by `/file`; lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// Accept markdown uploads, reject everything else with its declared type.
pub fn accept_upload(file: UploadedFile) -> Result<UploadResponse, UploadError> {
    if file.content_type == ACCEPTED_UPLOAD_TYPE {
        Ok(UploadResponse {
            name: file.filename,
        })
    } else {
        Err(UploadError::UnsupportedMediaType {
            content_type: file.content_type,
        })
    }
}

/// Find the first `file` part that carries a filename.
///
/// Parts without a filename are plain form fields, not files.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, UploadError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection, "Upload is not a multipart body");
        UploadError::MissingUpload
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::MissingUpload),
            Err(err) => {
                warn!(error = %err, "Malformed multipart body");
                return Err(UploadError::MissingUpload);
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_UPLOAD_TYPE)
            .to_string();

        let data = field.bytes().await.map_err(|err| {
            warn!(error = %err, "Failed to read uploaded file");
            UploadError::MissingUpload
        })?;

        return Ok(UploadedFile {
            filename,
            content_type,
            size: data.len(),
        });
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle root requests.
///
/// # Endpoint
///
/// `GET /`
///
/// # Response
///
/// `200 OK` with `{"user": "<name>"}`; the name is empty for anonymous callers.
pub async fn root_handler(CurrentUser(user): CurrentUser) -> Json<RootResponse> {
    Json(RootResponse {
        user: user.map(|u| u.into_inner()).unwrap_or_default(),
    })
}

/// Handle login requests.
///
/// # Endpoint
///
/// `POST /auth`
///
/// # Arguments
///
/// - `user`, `pass`: url-encoded or multipart form fields (query string
///   accepted as fallback)
///
/// # Response
///
/// - `200 OK`: `{"message": "ok"}` and a `Set-Cookie` carrying the session
/// - `401 Unauthorized`: `{"error": "invalid credentials", "message": "not ok"}`
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    args: Arguments,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let username = args.get("user").unwrap_or_default();
    let password = args.get("pass").unwrap_or_default();

    let token = state.gate.login(username, password).await?;

    Ok((
        jar.add(state.gate.session_cookie(token)),
        Json(MessageResponse {
            message: "ok".to_string(),
        }),
    ))
}

/// Handle session check requests.
///
/// # Endpoint
///
/// `GET /auth`
///
/// # Response
///
/// - `200 OK`: `{"message": "welcome back!", "meta": {"user": "<name>"}}`
/// - `401 Unauthorized`: `{"error": "unauthorized", "message": "login first"}`
pub async fn session_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<WelcomeResponse>, ApiError> {
    let user = state.gate.require_auth(&jar)?;

    Ok(Json(WelcomeResponse {
        message: "welcome back!".to_string(),
        meta: WelcomeMeta {
            user: user.into_inner(),
        },
    }))
}

/// Handle logout requests.
///
/// # Endpoint
///
/// `DELETE /auth`
///
/// # Response
///
/// - `200 OK`: empty body, every presented cookie cleared
/// - `403 Forbidden`: empty body, no cookie changes (no active session)
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let jar = state.gate.logout(jar)?;
    Ok((jar, StatusCode::OK))
}

/// Handle protected resource requests.
///
/// # Endpoint
///
/// `GET /forbidden`
///
/// # Response
///
/// - `200 OK`: `{"user": "<name>"}`
/// - `403 Forbidden`: `{"error": "unauthorized", "message": "login first"}`
pub async fn forbidden_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .gate
        .require_auth(&jar)
        .map_err(|err| ApiError::from(err).with_status(StatusCode::FORBIDDEN))?;

    Ok(Json(UserResponse {
        user: user.into_inner(),
    }))
}

/// Handle query-string search requests.
///
/// # Endpoint
///
/// `GET /searchlike?q=...`
///
/// # Response
///
/// `200 OK` with `{"q": "<value>"}`, or `{"q": null}` when absent.
pub async fn search_query_handler(RawQuery(query): RawQuery) -> Json<SearchResponse> {
    let args = Arguments::from_query(query.as_deref());
    Json(SearchResponse {
        q: args.get("q").map(str::to_string),
    })
}

/// Handle form search requests.
///
/// # Endpoint
///
/// `POST /searchlike` (url-encoded or multipart form body)
///
/// # Response
///
/// `200 OK` with `{"q": "<value>"}`; the body argument wins over the query
/// argument, `null` when neither is present.
pub async fn search_form_handler(args: Arguments) -> Json<SearchResponse> {
    Json(SearchResponse {
        q: args.get("q").map(str::to_string),
    })
}

/// Handle file uploads.
///
/// # Endpoint
///
/// `POST /file` (multipart, file part named `file`)
///
/// # Response
///
/// - `200 OK`: `{"name": "<filename>"}` for `text/markdown` files
/// - `400 Bad Request`: `{"error": "file"}` when no file part is present
/// - `415 Unsupported Media Type`: `{"error": "<declared content type>"}`
pub async fn upload_handler(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_upload(multipart).await?;
    debug!(
        filename = %file.filename,
        content_type = %file.content_type,
        size = file.size,
        "Received upload"
    );

    let response = accept_upload(file)?;
    info!(filename = %response.name, "Accepted upload");
    Ok(Json(response))
}

/// Handle static document requests.
///
/// # Endpoint
///
/// `GET /static`
///
/// # Response
///
/// - `200 OK`: the document with an `ETag` header
/// - `304 Not Modified`: empty body when `If-None-Match` matches the `ETag`
pub async fn static_handler(headers: HeaderMap) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(&StaticResponse::default())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let outcome = conditional::evaluate_headers(Bytes::from(body), &headers);
    debug!(status = outcome.status.as_u16(), etag = %outcome.etag, "Static document");
    Ok(outcome.into_response_with_type("application/json"))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
