//! Authentication integration tests.
//!
//! Tests verify:
//! - Valid credentials issue a replayable session cookie
//! - Url-encoded and multipart login forms are both read
//! - Invalid credentials are rejected without a session
//! - Protected endpoints answer 401/403 without a session
//! - Logout clears cookies only when a session exists
//! - Tampered, foreign and expired tokens count as anonymous

use std::time::Duration;

use axum::http::{header, StatusCode};

use session_gate::{
    create_router, RouterConfig, SessionSigner, StaticCredentials, Username,
};

use super::test_utils::{
    body_bytes, body_json, delete_with_cookie, get, get_with_cookie, login_cookie, login_request,
    markdown_part, multipart_request, post_form, send, session_cookie, set_cookies, test_router,
    CountingCredentials, Part, TEST_SECRET,
};

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let router = test_router();

    let response = send(&router, login_request("root", "toor")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let cookie = cookies
        .iter()
        .find(|c| c.starts_with("user="))
        .expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"message": "ok"}));
}

#[tokio::test]
async fn test_login_cookie_resolves_current_user() {
    let router = test_router();
    let cookie = login_cookie(&router).await;

    let response = send(&router, get_with_cookie("/", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"user": "root"}));
}

#[tokio::test]
async fn test_login_with_invalid_credentials() {
    let router = test_router();

    for (user, pass) in [("non-exists", "secret"), ("root", "wrong"), ("toor", "root"), ("", "")] {
        let response = send(&router, login_request(user, pass)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{user}/{pass}");
        assert!(session_cookie(&response).is_none());

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"error": "invalid credentials", "message": "not ok"})
        );
    }
}

#[tokio::test]
async fn test_login_with_missing_fields() {
    let router = test_router();

    let response = send(&router, post_form("/auth", "user=root")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&router, post_form("/auth", "")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_arguments_from_query_string() {
    let router = test_router();

    let response = send(&router, post_form("/auth?user=root&pass=toor", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn test_login_with_multipart_form() {
    let router = test_router();

    let parts = [
        Part::Field {
            name: "user",
            value: "root",
        },
        Part::Field {
            name: "pass",
            value: "toor",
        },
    ];
    let response = send(&router, multipart_request("/auth", &parts)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = session_cookie(&response).expect("session cookie");
    assert_eq!(body_json(response).await, serde_json::json!({"message": "ok"}));

    let response = send(&router, get_with_cookie("/", &cookie)).await;
    assert_eq!(body_json(response).await, serde_json::json!({"user": "root"}));
}

#[tokio::test]
async fn test_multipart_login_ignores_file_parts() {
    let router = test_router();

    let parts = [
        Part::Field {
            name: "user",
            value: "root",
        },
        Part::File {
            name: "pass",
            filename: "pass.txt",
            content_type: Some("text/plain"),
            data: b"toor",
        },
        markdown_part("notes.md"),
    ];
    let response = send(&router, multipart_request("/auth", &parts)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_multipart_login_overrides_query() {
    let router = test_router();

    let parts = [Part::Field {
        name: "pass",
        value: "toor",
    }];
    let response = send(&router, multipart_request("/auth?user=root&pass=wrong", &parts)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_uses_injected_credential_store() {
    let credentials = CountingCredentials::default();
    let router = create_router(
        credentials.clone(),
        RouterConfig::new(TEST_SECRET).with_tracing(false),
    );

    let response = send(&router, login_request("root", "toor")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&router, login_request("alice", "wonderland")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();

    let response = send(&router, get_with_cookie("/auth", &cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["meta"]["user"], "alice");

    assert_eq!(credentials.calls(), 2);
}

#[tokio::test]
async fn test_secure_cookie_flag() {
    let router = create_router(
        StaticCredentials::new("root", "toor"),
        RouterConfig::new(TEST_SECRET)
            .with_secure_cookies(true)
            .with_tracing(false),
    );

    let response = send(&router, login_request("root", "toor")).await;
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("user=") && c.contains("Secure")));
}

// =============================================================================
// Session Check
// =============================================================================

#[tokio::test]
async fn test_session_check_with_cookie() {
    let router = test_router();
    let cookie = login_cookie(&router).await;

    let response = send(&router, get_with_cookie("/auth", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "welcome back!", "meta": {"user": "root"}})
    );
}

#[tokio::test]
async fn test_session_check_without_cookie() {
    let router = test_router();

    let response = send(&router, get("/auth")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "unauthorized", "message": "login first"})
    );
}

// =============================================================================
// Protected Resource
// =============================================================================

#[tokio::test]
async fn test_forbidden_with_session() {
    let router = test_router();
    let cookie = login_cookie(&router).await;

    let response = send(&router, get_with_cookie("/forbidden", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"user": "root"}));
}

#[tokio::test]
async fn test_forbidden_without_session() {
    let router = test_router();

    let response = send(&router, get("/forbidden")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "unauthorized", "message": "login first"})
    );
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_with_session() {
    let router = test_router();
    let cookie = login_cookie(&router).await;

    let response = send(&router, delete_with_cookie("/auth", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let removal = cookies
        .iter()
        .find(|c| c.starts_with("user="))
        .expect("session cookie removal");
    assert!(removal.starts_with("user=;"));
    assert!(removal.contains("Max-Age=0"));

    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_logout_clears_every_presented_cookie() {
    let router = test_router();
    let cookie = login_cookie(&router).await;

    let response = send(
        &router,
        delete_with_cookie("/auth", Some(&format!("{cookie}; theme=dark"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("user=;")));
    assert!(cookies.iter().any(|c| c.starts_with("theme=;")));
}

#[tokio::test]
async fn test_logout_without_session() {
    let router = test_router();

    let response = send(&router, delete_with_cookie("/auth", None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_logout_with_invalid_session_does_not_touch_cookies() {
    let router = test_router();

    let response = send(
        &router,
        delete_with_cookie("/auth", Some("user=forged-token; theme=dark")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

// =============================================================================
// Token Validation
// =============================================================================

#[tokio::test]
async fn test_tampered_cookie_is_anonymous() {
    let router = test_router();
    let cookie = login_cookie(&router).await;

    // Flip the last signature character
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    let response = send(&router, get_with_cookie("/forbidden", &tampered)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&router, get_with_cookie("/", &tampered)).await;
    assert_eq!(body_json(response).await, serde_json::json!({"user": ""}));
}

#[tokio::test]
async fn test_cookie_signed_with_other_key_is_anonymous() {
    let router = test_router();
    let signer = SessionSigner::new("some-other-secret", Duration::from_secs(3600));
    let token = signer.sign(&Username::new("root").unwrap());

    let response = send(&router, get_with_cookie("/auth", &format!("user={token}"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_cookie_is_anonymous() {
    let router = test_router();
    let signer = SessionSigner::new(TEST_SECRET, Duration::from_secs(3600));
    let token = signer.sign_at(&Username::new("root").unwrap(), 1_000_000);

    let response = send(&router, get_with_cookie("/auth", &format!("user={token}"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_externally_minted_cookie_is_accepted() {
    let router = test_router();
    let signer = SessionSigner::new(TEST_SECRET, Duration::from_secs(3600));
    let token = signer.sign(&Username::new("operator").unwrap());

    let response = send(&router, get_with_cookie("/forbidden", &format!("user={token}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"user": "operator"})
    );
}

#[tokio::test]
async fn test_short_session_ttl_is_enforced() {
    let router = create_router(
        StaticCredentials::new("root", "toor"),
        RouterConfig::new(TEST_SECRET)
            .with_session_ttl(Duration::from_secs(60))
            .with_tracing(false),
    );
    let signer = SessionSigner::new(TEST_SECRET, Duration::from_secs(3600));
    let issued = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        - 600;
    let token = signer.sign_at(&Username::new("root").unwrap(), issued);

    let response = send(&router, get_with_cookie("/auth", &format!("user={token}"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
