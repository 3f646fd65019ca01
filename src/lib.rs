//! # Session Gate
//!
//! A small HTTP service demonstrating signed session-cookie authentication,
//! query/body argument parsing, file upload handling and conditional-response
//! caching on top of axum.
//!
//! ## Features
//!
//! - **Stateless sessions**: HMAC-SHA256 signed tokens carried in an HTTP-only cookie
//! - **Pluggable credentials**: login checks go through the [`CredentialStore`] trait
//! - **Argument echo**: query and form-body argument lookup
//! - **Uploads**: multipart file acceptance by declared content type
//! - **Conditional GET**: SHA-256 ETags with `If-None-Match` short-circuiting
//!
//! ## Architecture
//!
//! - [`session`] - Token signing, credential verification and the session gate
//! - [`server`] - Axum handlers, routes and the ETag helper
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use session_gate::{create_router, RouterConfig, StaticCredentials};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RouterConfig::new("a-long-random-session-secret-value");
//!     let router = create_router(StaticCredentials::new("root", "toor"), config);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:2297").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat};
pub use error::{AuthError, TokenError, UploadError};
pub use server::{create_router, ApiError, AppState, ErrorResponse, RouterConfig};
pub use session::{
    CredentialStore, CurrentUser, SessionGate, SessionSigner, StaticCredentials, Username,
    SESSION_COOKIE,
};
