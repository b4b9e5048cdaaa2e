//! Integration tests for Boutique.
//!
//! These tests drive a running storefront over HTTP and inspect its database.
//! They are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p boutique-cli -- migrate
//! cargo run -p boutique-cli -- seed products
//! cargo run -p boutique-storefront &
//! cargo test -p boutique-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - Server under test (default: `http://localhost:3000`)
//! - `POSTGRES_URL` / `DATABASE_URL` - Same database the server uses

use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Database URL shared with the server under test.
///
/// # Panics
///
/// Panics if neither `POSTGRES_URL` nor `DATABASE_URL` is set.
#[must_use]
pub fn database_url() -> SecretString {
    std::env::var("POSTGRES_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("POSTGRES_URL or DATABASE_URL must be set")
}

/// A browser-like client: keeps cookies and does not follow redirects, so
/// tests can assert on `303 See Other` targets.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context with an empty cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: storefront_base_url(),
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a urlencoded form to a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Register a fresh account and leave this context signed in.
    ///
    /// Returns the generated email address.
    ///
    /// # Panics
    ///
    /// Panics if sign-up does not redirect.
    pub async fn sign_up_fresh_user(&self) -> String {
        let email = unique_email();
        let resp = self
            .post_form(
                "/auth/sign-up",
                &[
                    ("name", "Integration Tester"),
                    ("email", &email),
                    ("password", "secret123"),
                    ("confirm_password", "secret123"),
                    ("callback_url", "/"),
                ],
            )
            .await;
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
        email
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Email address that can't collide with earlier runs.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4().simple())
}

/// Connect to the database under test.
///
/// # Panics
///
/// Panics if the database is unreachable.
pub async fn connect() -> PgPool {
    PgPool::connect(database_url().expose_secret())
        .await
        .expect("Failed to connect to database")
}

/// Location header of a redirect response.
#[must_use]
pub fn location(resp: &Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
