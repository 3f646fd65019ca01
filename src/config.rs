//! Configuration management for the session gate service.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `GATE_` prefix
//! - Defaults for every optional setting
//!
//! # Commands
//!
//! - `serve` - Run the HTTP server
//! - `token` - Mint a session token for scripted clients
//!
//! # Environment Variables
//!
//! - `GATE_HOST` - Server bind address (default: 0.0.0.0)
//! - `GATE_PORT` - Server port (default: 2297)
//! - `GATE_SESSION_SECRET` - HMAC secret for session tokens (required)
//! - `GATE_SESSION_TTL_DAYS` - Session lifetime in days (default: 31)
//! - `GATE_USERNAME` / `GATE_PASSWORD` - Accepted login (default: root / toor)
//! - `GATE_SECURE_COOKIES` - Mark the session cookie `Secure` (default: false)
//! - `GATE_MAX_BODY_BYTES` - Request body limit (default: 100 MiB)
//! - `GATE_CORS_ORIGINS` - Allowed CORS origins, comma separated

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::server::DEFAULT_MAX_BODY_BYTES;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 2297;

/// Default session lifetime in days.
pub const DEFAULT_SESSION_TTL_DAYS: u64 = 31;

/// Longest accepted session lifetime in days.
pub const MAX_SESSION_TTL_DAYS: u64 = 365;

/// Default accepted username.
pub const DEFAULT_USERNAME: &str = "root";

/// Default accepted password.
pub const DEFAULT_PASSWORD: &str = "toor";

/// Secrets shorter than this draw a startup warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

// =============================================================================
// CLI
// =============================================================================

/// Session gate - signed-cookie authentication demo service.
#[derive(Parser, Debug, Clone)]
#[command(name = "session-gate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeConfig),

    /// Mint a session token for a username.
    Token(TokenConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GATE_PORT")]
    pub port: u16,

    /// Secret key for signing session tokens.
    #[arg(long, env = "GATE_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Session lifetime in days.
    #[arg(long, default_value_t = DEFAULT_SESSION_TTL_DAYS, env = "GATE_SESSION_TTL_DAYS")]
    pub session_ttl_days: u64,

    /// Username accepted by the login endpoint.
    #[arg(long, default_value = DEFAULT_USERNAME, env = "GATE_USERNAME")]
    pub username: String,

    /// Password accepted by the login endpoint.
    #[arg(long, default_value = DEFAULT_PASSWORD, env = "GATE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Mark the session cookie `Secure` (HTTPS only).
    #[arg(long, default_value_t = false, env = "GATE_SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "GATE_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GATE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match self.session_secret.as_deref() {
            None | Some("") => {
                return Err(
                    "No session secret provided. Set --session-secret or GATE_SESSION_SECRET"
                        .to_string(),
                )
            }
            Some(_) => {}
        }

        if self.session_ttl_days == 0 || self.session_ttl_days > MAX_SESSION_TTL_DAYS {
            return Err(format!(
                "session_ttl_days must be between 1 and {}",
                MAX_SESSION_TTL_DAYS
            ));
        }

        if self.username.is_empty() {
            return Err("username must not be empty".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The session secret, or an empty string (call validate() first).
    pub fn session_secret_or_empty(&self) -> &str {
        self.session_secret.as_deref().unwrap_or("")
    }

    /// Whether the secret is shorter than recommended.
    pub fn has_weak_secret(&self) -> bool {
        self.session_secret_or_empty().len() < RECOMMENDED_SECRET_LEN
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_days * SECONDS_PER_DAY)
    }
}

// =============================================================================
// Token
// =============================================================================

/// Output format for the `token` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutputFormat {
    /// The bare token
    Token,
    /// A `Cookie` header value (`user=<token>`)
    Cookie,
    /// JSON with token, user and expiry
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct TokenConfig {
    /// Secret key the server signs sessions with.
    #[arg(long, env = "GATE_SESSION_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Username to embed in the token.
    #[arg(long, default_value = DEFAULT_USERNAME)]
    pub user: String,

    /// Session lifetime in days (only reported; verification uses the server's).
    #[arg(long, default_value_t = DEFAULT_SESSION_TTL_DAYS)]
    pub ttl_days: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = TokenOutputFormat::Cookie)]
    pub format: TokenOutputFormat,
}

impl TokenConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("secret must not be empty".to_string());
        }
        if self.user.is_empty() {
            return Err("user must not be empty".to_string());
        }
        if self.ttl_days == 0 || self.ttl_days > MAX_SESSION_TTL_DAYS {
            return Err(format!(
                "ttl_days must be between 1 and {}",
                MAX_SESSION_TTL_DAYS
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_days * SECONDS_PER_DAY)
    }
}

// =============================================================================
// Tests
// =============================================================================
