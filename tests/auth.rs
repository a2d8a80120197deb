//! Runs in its own process so setting the token cannot leak into other tests.

mod common;

use common::TestApp;
use fairway::api::auth::API_TOKEN_ENV;
use tower::ServiceExt;

#[tokio::test]
async fn test_bearer_token_required_when_configured() {
    std::env::set_var(API_TOKEN_ENV, "s3cret");
    let app = TestApp::new();

    // Health stays open
    let (code, _) = app.call("GET", "/api/health", None).await;
    assert_eq!(code, 200);

    let (code, body) = app.call("GET", "/api/taxonomy", None).await;
    assert_eq!(code, 401);
    assert_eq!(body["kind"], "authentication_error");

    let req = axum::http::Request::builder()
        .uri("/api/taxonomy")
        .header("Authorization", "Bearer wrong")
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.router().oneshot(req).await.unwrap().status(), 401);

    let req = axum::http::Request::builder()
        .uri("/api/taxonomy")
        .header("Authorization", "Bearer s3cret")
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.router().oneshot(req).await.unwrap().status(), 200);
    std::env::remove_var(API_TOKEN_ENV);
}
