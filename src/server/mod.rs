//! HTTP server layer for the session gate service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     /  /auth  /forbidden  /searchlike  /file  /static           │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │ conditional │  │        routes           │  │
//! │  │ (requests)  │  │   (ETag)    │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod arguments;
pub mod conditional;
pub mod handlers;
pub mod routes;

pub use arguments::Arguments;
pub use conditional::{compute_etag, etag_matches, evaluate, ConditionalResponse};
pub use handlers::{
    accept_upload, forbidden_handler, health_handler, login_handler, logout_handler,
    root_handler, search_form_handler, search_query_handler, session_handler, static_handler,
    upload_handler, ApiError, AppState, ErrorResponse, HealthResponse, MessageResponse,
    RootResponse, SearchResponse, StaticResponse, UploadResponse, UploadedFile, UserResponse,
    WelcomeMeta, WelcomeResponse,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_BODY_BYTES};
