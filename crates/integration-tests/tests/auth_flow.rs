//! Sign-up, sign-in and sign-out against a running storefront.
//!
//! Requires a migrated database and the storefront server.

use boutique_integration_tests::{TestContext, location, unique_email};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health() {
    let ctx = TestContext::new();

    let resp = ctx.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = ctx.get("/health/ready").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_sign_up_then_sign_in() {
    let ctx = TestContext::new();
    let email = ctx.sign_up_fresh_user().await;

    // Signed in: the sign-in page bounces back to the callback.
    let resp = ctx.get("/auth/sign-in?callback_url=/account/orders").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/account/orders"));

    let resp = ctx.post_form("/auth/sign-out", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = ctx.get("/account/orders").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp).as_deref(),
        Some("/auth/sign-in?callback_url=%2Faccount%2Forders")
    );

    let resp = ctx
        .post_form(
            "/auth/sign-in",
            &[
                ("email", &email),
                ("password", "secret123"),
                ("callback_url", "/account/orders"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/account/orders"));

    let resp = ctx.get("/account/orders").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wrong_password() {
    let ctx = TestContext::new();
    let email = ctx.sign_up_fresh_user().await;
    ctx.post_form("/auth/sign-out", &[]).await;

    let resp = ctx
        .post_form(
            "/auth/sign-in",
            &[("email", &email), ("password", "not-the-password")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = resp.text().await.unwrap_or_default();
    assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_duplicate_email() {
    let first = TestContext::new();
    let email = first.sign_up_fresh_user().await;

    let second = TestContext::new();
    let resp = second
        .post_form(
            "/auth/sign-up",
            &[
                ("name", "Someone Else"),
                ("email", &email),
                ("password", "secret123"),
                ("confirm_password", "secret123"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = resp.text().await.unwrap_or_default();
    assert!(body.contains("An account with this email already exists"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_open_redirect_rejected() {
    let ctx = TestContext::new();
    let resp = ctx
        .post_form(
            "/auth/sign-up",
            &[
                ("name", "Integration Tester"),
                ("email", &unique_email()),
                ("password", "secret123"),
                ("confirm_password", "secret123"),
                ("callback_url", "//evil.example.com"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/"));
}
