//! Signed session tokens.
//!
//! A session token binds a username to the moment it was issued and is signed
//! with HMAC-SHA256 under the server's session secret:
//!
//! ```text
//! token     = hex(username) "." issued_at "." hex(signature)
//! signature = HMAC-SHA256(secret_key, "user|{hex(username)}|{issued_at}")
//! ```
//!
//! The cookie name is part of the signed message, so a token minted for one
//! cookie cannot be replayed under another.
//!
//! # Example
//!
//! ```rust
//! use session_gate::session::{SessionSigner, Username};
//! use std::time::Duration;
//!
//! let signer = SessionSigner::new("my-secret-key", Duration::from_secs(3600));
//! let user = Username::new("root").unwrap();
//!
//! let token = signer.sign(&user);
//! assert_eq!(signer.verify(&token).unwrap(), user);
//! ```

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::gate::SESSION_COOKIE;
use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime (31 days).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(31 * 24 * 60 * 60);

/// How far in the future an issue timestamp may lie before a token is rejected.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(31 * 24 * 60 * 60);

const SEPARATOR: char = '.';

// =============================================================================
// Username
// =============================================================================

/// A non-empty username.
///
/// The empty string is not a valid username, so a decoded token can never
/// surface as an authenticated empty user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Returns `None` for the empty string.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Signer
// =============================================================================

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    /// Secret key for HMAC computation
    secret_key: Vec<u8>,

    /// How long a token stays valid after it was issued
    ttl: Duration,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret_key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionSigner {
    /// Create a signer with the given secret key and session lifetime.
    ///
    /// The key should be at least 32 bytes of random data.
    pub fn new(secret_key: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            ttl,
        }
    }

    /// Session lifetime applied during verification.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a username, stamping the token with the current time.
    pub fn sign(&self, user: &Username) -> String {
        self.sign_at(user, unix_now())
    }

    /// Sign a username with an explicit issue timestamp (Unix epoch seconds).
    pub fn sign_at(&self, user: &Username, issued_at: u64) -> String {
        let encoded_user = hex::encode(user.as_str());
        let signature = self.compute_signature(&encoded_user, issued_at);
        format!("{encoded_user}{SEPARATOR}{issued_at}{SEPARATOR}{signature}")
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Username, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Username, TokenError> {
        let mut parts = token.split(SEPARATOR);
        let (Some(encoded_user), Some(issued), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let issued_at: u64 = issued.parse().map_err(|_| TokenError::Malformed)?;
        let provided_sig = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let expected_sig = self.compute_mac(encoded_user, issued_at);
        if !bool::from(provided_sig.ct_eq(&expected_sig)) {
            return Err(TokenError::InvalidSignature);
        }

        // Signature is checked first so the timestamp is known to be ours
        if issued_at.saturating_add(self.ttl.as_secs()) < now {
            return Err(TokenError::Expired {
                issued_at,
                current_time: now,
            });
        }
        if issued_at > now.saturating_add(MAX_CLOCK_SKEW.as_secs()) {
            return Err(TokenError::IssuedInFuture {
                issued_at,
                current_time: now,
            });
        }

        let raw_user = hex::decode(encoded_user).map_err(|_| TokenError::InvalidUsername)?;
        let name = String::from_utf8(raw_user).map_err(|_| TokenError::InvalidUsername)?;
        Username::new(name).ok_or(TokenError::InvalidUsername)
    }

    fn compute_signature(&self, encoded_user: &str, issued_at: u64) -> String {
        hex::encode(self.compute_mac(encoded_user, issued_at))
    }

    fn compute_mac(&self, encoded_user: &str, issued_at: u64) -> Vec<u8> {
        let message = signature_base(encoded_user, issued_at);

        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn signature_base(encoded_user: &str, issued_at: u64) -> String {
    format!("{SESSION_COOKIE}|{encoded_user}|{issued_at}")
}

/// Current Unix time in seconds; a clock before the epoch reads as zero.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Tests
// =============================================================================
