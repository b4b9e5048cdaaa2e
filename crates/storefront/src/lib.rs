//! Boutique storefront library.
//!
//! Catalog, cart, checkout, accounts and the admin back office, served as
//! server-rendered HTML forms. The binary in `main.rs` wires this router to
//! a `PostgreSQL` session store and Sentry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod form;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    routing::get,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use state::AppState;

/// Build the storefront router with sessions kept in `store`.
///
/// Layers, outermost first: `TraceLayer` (`http_request` span), request id,
/// session.
pub fn app<S: SessionStore + Clone>(state: AppState, store: S) -> Router {
    let session_layer = middleware::session_layer(store, state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION};
    use boutique_core::UserId;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;
    use tower_sessions::cookie::time::{self, OffsetDateTime};
    use tower_sessions::session::{Id, Record};

    use super::*;
    use crate::config::test_config;
    use crate::models::{CurrentUser, Role, session_keys};

    /// Router over a lazily connected pool. Paths that reach the database
    /// fail fast when none is running.
    fn test_app_with_store(store: MemoryStore) -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(250))
            .connect_lazy("postgres://localhost/boutique_test")
            .unwrap();
        app(AppState::new(config, pool), store)
    }

    fn test_app() -> Router {
        test_app_with_store(MemoryStore::default())
    }

    /// Store a signed-in session and return the cookie that selects it.
    async fn signed_in_session(store: &MemoryStore) -> String {
        let user = CurrentUser {
            id: UserId::generate(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
        };
        let mut record = Record {
            id: Id::default(),
            data: HashMap::from([(
                session_keys::CURRENT_USER.to_string(),
                serde_json::to_value(&user).unwrap(),
            )]),
            expiry_date: OffsetDateTime::now_utc() + time::Duration::days(1),
        };
        store.create(&mut record).await.unwrap();
        format!("{}={}", middleware::session::SESSION_COOKIE_NAME, record.id)
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri)
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_sign_up_short_name_rerenders_form() {
        let response = test_app()
            .oneshot(form_post(
                "/auth/sign-up",
                "name=Al&email=al%40example.com&password=secret&confirm_password=secret&callback_url=%2Fcart",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("name: Name must be at least 3 characters"));
    }

    #[tokio::test]
    async fn test_sign_up_password_mismatch() {
        let response = test_app()
            .oneshot(form_post(
                "/auth/sign-up",
                "name=Alice&email=alice%40example.com&password=secret&confirm_password=other",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("confirm_password: Passwords do not match"));
    }

    #[tokio::test]
    async fn test_sign_in_invalid_email_rerenders_form() {
        let response = test_app()
            .oneshot(form_post("/auth/sign-in", "email=nope&password=secret"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("email: Invalid email address"));
    }

    #[tokio::test]
    async fn test_sign_in_page_keeps_local_callback_only() {
        let response = test_app()
            .oneshot(
                Request::get("/auth/sign-in?callbackUrl=https%3A%2F%2Fevil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_text(response).await.contains("evil.example"));
    }

    #[tokio::test]
    async fn test_protected_page_redirects_to_sign_in() {
        let response = test_app()
            .oneshot(
                Request::get("/checkout/shipping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/sign-in?callback_url=%2Fcheckout%2Fshipping"
        );
    }

    #[tokio::test]
    async fn test_admin_page_redirects_anonymous() {
        let response = test_app()
            .oneshot(
                Request::get("/admin/products/new")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_signed_in_user_skips_sign_in_page() {
        let store = MemoryStore::default();
        let cookie = signed_in_session(&store).await;

        let response = test_app_with_store(store)
            .oneshot(get_with_cookie(
                "/auth/sign-in?callback_url=%2Faccount%2Forders",
                &cookie,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/account/orders");
    }

    #[tokio::test]
    async fn test_signed_in_user_skips_sign_up_page_with_safe_callback() {
        let store = MemoryStore::default();
        let cookie = signed_in_session(&store).await;

        let response = test_app_with_store(store)
            .oneshot(get_with_cookie(
                "/auth/sign-up?callbackUrl=https%3A%2F%2Fevil.example",
                &cookie,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn test_huge_listing_page_does_not_panic() {
        let response = test_app()
            .oneshot(
                Request::get("/products?page=9223372036854775807")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // 500 without a database, 200 with one; never a panic.
        let status = response.status();
        assert!(status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR);
    }
}
