//! The session gate: the single decision point every handler branches on.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, info, warn};

use super::credentials::CredentialStore;
use super::token::{SessionSigner, Username};
use crate::error::AuthError;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "user";

/// Attributes applied to the session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Send the cookie over HTTPS only
    pub secure: bool,

    /// Browser-side lifetime; matches the token lifetime
    pub max_age: Duration,
}

/// Decides whether a request is authenticated and issues or clears sessions.
#[derive(Clone)]
pub struct SessionGate {
    signer: SessionSigner,
    credentials: Arc<dyn CredentialStore>,
    cookie: CookieSettings,
}

impl SessionGate {
    /// Create a gate; the cookie lifetime follows the signer's TTL.
    pub fn new(signer: SessionSigner, credentials: Arc<dyn CredentialStore>) -> Self {
        let cookie = CookieSettings {
            secure: false,
            max_age: signer.ttl(),
        };
        Self {
            signer,
            credentials,
            cookie,
        }
    }

    /// Mark the session cookie `Secure`.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    /// The username carried by a valid session cookie, if any.
    ///
    /// Missing, malformed, tampered and expired tokens all resolve to `None`.
    pub fn resolve_current_user(&self, jar: &CookieJar) -> Option<Username> {
        let cookie = jar.get(SESSION_COOKIE)?;
        match self.signer.verify(cookie.value()) {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(error = %err, "Ignoring session cookie");
                None
            }
        }
    }

    /// Check a login attempt and mint a session token for it.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !self.credentials.verify(username, password).await {
            warn!(user = %username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let user = Username::new(username).ok_or(AuthError::InvalidCredentials)?;

        info!(user = %user, "Login accepted");
        Ok(self.signer.sign(&user))
    }

    /// Clear every cookie the client sent, provided it holds a valid session.
    ///
    /// Without a session the jar is left untouched and `Forbidden` is returned.
    pub fn logout(&self, jar: CookieJar) -> Result<CookieJar, AuthError> {
        let user = self.resolve_current_user(&jar).ok_or(AuthError::Forbidden)?;

        let names: Vec<String> = jar.iter().map(|c| c.name().to_string()).collect();
        let jar = names.into_iter().fold(jar, |jar, name| {
            jar.remove(Cookie::build((name, "")).path("/"))
        });

        info!(user = %user, "Logged out");
        Ok(jar)
    }

    /// The current user, or `Unauthorized`.
    pub fn require_auth(&self, jar: &CookieJar) -> Result<Username, AuthError> {
        self.resolve_current_user(jar).ok_or(AuthError::Unauthorized)
    }

    /// Build the cookie that carries `token` back to the client.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.cookie.max_age.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(max_age))
            .build()
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Axum extractor resolving the current user from the session cookie.
///
/// Never rejects: anonymous requests yield `CurrentUser(None)`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Username>);

impl<S> FromRequestParts<S> for CurrentUser
where
    SessionGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = SessionGate::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(CurrentUser(gate.resolve_current_user(&jar)))
    }
}

// =============================================================================
// Tests
// =============================================================================
