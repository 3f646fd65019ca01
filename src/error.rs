use http::StatusCode;
use thiserror::Error;

/// Authentication and authorization failures surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login attempted with a pair the credential store rejected
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Protected resource requested without a valid session
    #[error("unauthorized")]
    Unauthorized,

    /// Logout requested without a valid session
    #[error("forbidden")]
    Forbidden,
}

impl AuthError {
    /// Default HTTP status for this error.
    ///
    /// Endpoints that deny anonymous callers with a different status override
    /// it at the response layer.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

/// Failures while accepting an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No multipart part named `file` carrying a filename
    #[error("missing file part")]
    MissingUpload,

    /// The uploaded file declared a content type other than markdown
    #[error("unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingUpload => StatusCode::BAD_REQUEST,
            UploadError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

/// Reasons a session token failed verification.
///
/// These never reach clients: the session gate treats every one of them as
/// "no current user".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token does not have the `user.issued.signature` shape
    #[error("malformed session token")]
    Malformed,

    /// Signature does not match the payload under the configured key
    #[error("invalid session token signature")]
    InvalidSignature,

    /// Token is older than the session lifetime
    #[error("session token issued at {issued_at} expired (current time: {current_time})")]
    Expired { issued_at: u64, current_time: u64 },

    /// Token claims an issue time too far ahead of the server clock
    #[error("session token issued in the future at {issued_at} (current time: {current_time})")]
    IssuedInFuture { issued_at: u64, current_time: u64 },

    /// Payload is not a non-empty UTF-8 username
    #[error("session token carries an invalid username")]
    InvalidUsername,
}
