//! Session gate - signed-cookie authentication demo service.
//!
//! This binary starts the HTTP server or mints session tokens.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_gate::{
    config::{Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat, RECOMMENDED_SECRET_LEN},
    create_router, RouterConfig, SessionSigner, StaticCredentials, Username, SESSION_COOKIE,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Token(config) => run_token(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("session-gate v{}", env!("CARGO_PKG_VERSION"));
    let credentials = StaticCredentials::new(&config.username, &config.password);

    info!("Configuration:");
    info!("  Login user: {}", credentials.username());
    info!("  Session lifetime: {} day(s)", config.session_ttl_days);
    info!("  Max body size: {} bytes", config.max_body_bytes);
    if config.has_weak_secret() {
        warn!(
            "  Session secret is shorter than {} bytes; use a long random value in production",
            RECOMMENDED_SECRET_LEN
        );
    }
    if !config.secure_cookies {
        warn!("  Session cookies are sent over plain HTTP (--secure-cookies is off)");
    }

    let router = create_router(credentials, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!(
        "  curl -i -c jar -d 'user={}&pass=...' http://{}/auth",
        config.username, addr
    );
    info!("  curl -i -b jar http://{}/forbidden", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "session_gate=debug,tower_http=debug"
    } else {
        "session_gate=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the serve configuration.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new(config.session_secret_or_empty())
        .with_session_ttl(config.session_ttl())
        .with_secure_cookies(config.secure_cookies)
        .with_max_body_bytes(config.max_body_bytes)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Token Command
// =============================================================================

fn run_token(config: TokenConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(user) = Username::new(config.user.clone()) else {
        eprintln!("Error: user must not be empty");
        return ExitCode::FAILURE;
    };

    let signer = SessionSigner::new(&config.secret, config.ttl());
    let token = signer.sign(&user);

    match config.format {
        TokenOutputFormat::Token => println!("{}", token),
        TokenOutputFormat::Cookie => println!("{}={}", SESSION_COOKIE, token),
        TokenOutputFormat::Json => {
            let json = serde_json::json!({
                "cookie": SESSION_COOKIE,
                "token": token,
                "user": user.as_str(),
                "ttl_days": config.ttl_days,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(out) => println!("{}", out),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
