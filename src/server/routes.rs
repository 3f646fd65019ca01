//! Router configuration for the session gate service.
//!
//! # Route Structure
//!
//! ```text
//! /            GET              - Current user (public)
//! /auth        POST|GET|DELETE  - Login, session check, logout
//! /forbidden   GET              - Protected resource
//! /searchlike  GET|POST         - Argument echo (public)
//! /file        POST             - Markdown upload (public)
//! /static      GET              - ETag-cached document (public)
//! /health      GET              - Health check (public)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use session_gate::server::routes::{create_router, RouterConfig};
//! use session_gate::session::StaticCredentials;
//!
//! let config = RouterConfig::new("my-secret-key")
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(StaticCredentials::new("root", "toor"), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:2297").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    forbidden_handler, health_handler, login_handler, logout_handler, root_handler,
    search_form_handler, search_query_handler, session_handler, static_handler, upload_handler,
    AppState,
};
use crate::session::{CredentialStore, SessionGate, SessionSigner, DEFAULT_SESSION_TTL};

/// Default request body limit (100 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret key for signing session tokens
    pub session_secret: String,

    /// Session token and cookie lifetime
    pub session_ttl: Duration,

    /// Whether the session cookie is marked `Secure`
    pub secure_cookies: bool,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("session_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("secure_cookies", &self.secure_cookies)
            .field("cors_origins", &self.cors_origins)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

impl RouterConfig {
    /// Create a router configuration with the given session secret.
    ///
    /// By default:
    /// - Sessions last 31 days
    /// - Cookies are not marked `Secure`
    /// - CORS allows any origin
    /// - Bodies up to 100 MiB are accepted
    /// - Tracing is enabled
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
            session_ttl: DEFAULT_SESSION_TTL,
            secure_cookies: false,
            cors_origins: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            enable_tracing: true,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// The credential store decides which logins succeed; the configuration
/// supplies the signing key and transport settings.
pub fn create_router<C>(credentials: C, config: RouterConfig) -> Router
where
    C: CredentialStore + 'static,
{
    let signer = SessionSigner::new(&config.session_secret, config.session_ttl);
    let gate = SessionGate::new(signer, Arc::new(credentials))
        .with_secure_cookies(config.secure_cookies);

    let router = build_routes(AppState::new(gate))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn build_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route(
            "/auth",
            post(login_handler)
                .get(session_handler)
                .delete(logout_handler),
        )
        .route("/forbidden", get(forbidden_handler))
        .route(
            "/searchlike",
            get(search_query_handler).post(search_form_handler),
        )
        .route("/file", post(upload_handler))
        .route("/static", get(static_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, IF_NONE_MATCH])
        .expose_headers([ETAG])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            // Cookies only cross origins that are named explicitly
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins).allow_credentials(true)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
