//! Credential verification.
//!
//! Handlers never compare passwords themselves; they ask a [`CredentialStore`].
//! Deployments backed by a real identity provider implement the trait and hand
//! it to the router in place of [`StaticCredentials`].

use async_trait::async_trait;
use subtle::ConstantTimeEq;

/// Checks a username/password pair.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns `true` when the pair identifies a known user.
    async fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single fixed username/password pair.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> bool {
        // Both halves are always compared so timing does not reveal which one failed
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}
