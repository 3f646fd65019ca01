//! Session layer for the gate service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          SessionGate                            │
//! │   resolve_current_user / login / logout / require_auth          │
//! │                                                                 │
//! │  ┌─────────────────────┐        ┌─────────────────────────────┐ │
//! │  │   SessionSigner     │        │      CredentialStore        │ │
//! │  │ (HMAC-SHA256 token) │        │ (verify user + password)    │ │
//! │  └─────────────────────┘        └─────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no server-side session table: the token itself carries the
//! username and issue time, and every request is verified independently.

mod credentials;
mod gate;
mod token;

pub use credentials::{CredentialStore, StaticCredentials};
pub use gate::{CookieSettings, CurrentUser, SessionGate, SESSION_COOKIE};
pub use token::{SessionSigner, Username, DEFAULT_SESSION_TTL, MAX_CLOCK_SKEW};
