//! Health checks and response headers.

use axum::http::StatusCode;
use strivo_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();

    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");

    let resp = app.get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers() {
    let mut app = TestApp::new();
    let resp = app.get("/health").await;

    assert_eq!(resp.header("x-frame-options"), Some("DENY"));
    assert_eq!(resp.header("x-content-type-options"), Some("nosniff"));
    assert!(resp.header("x-request-id").is_some());

    let csp = resp.header("content-security-policy").unwrap_or_default();
    assert!(csp.contains("default-src 'none'"));
    assert!(csp.contains("https://unpkg.com"));
}

#[tokio::test]
async fn test_page_script_carries_csp_nonce() {
    let mut app = TestApp::new();
    let resp = app.get("/").await;

    let csp = resp.header("content-security-policy").unwrap_or_default();
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap_or_default();
    assert!(!nonce.is_empty());
    assert!(resp.body.contains(&format!("<script nonce=\"{nonce}\">")));
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let mut app = TestApp::new();
    let first = app.get("/health").await;
    let second = app.get("/health").await;
    assert_ne!(first.header("x-request-id"), second.header("x-request-id"));
}
