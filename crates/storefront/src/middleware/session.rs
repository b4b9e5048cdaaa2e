//! Session layer and cart-session helpers.
//!
//! Sessions live in `PostgreSQL` (`tower_sessions.session`) in production.
//! Tests plug in any other `SessionStore`.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "boutique_session";

/// Idle time after which a session expires (7 days).
const SESSION_EXPIRY: Duration = Duration::days(7);

/// Session layer over `store` with the storefront cookie policy.
///
/// Production passes a `PostgresStore`; tests use a `MemoryStore`.
#[must_use]
pub fn session_layer<S: SessionStore>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(SESSION_EXPIRY))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Anonymous cart id stored in the session, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn session_cart_id(session: &Session) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(session_keys::SESSION_CART_ID).await
}

/// Anonymous cart id, assigning a fresh one on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn ensure_session_cart_id(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(id) = session_cart_id(session).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(session_keys::SESSION_CART_ID, &id).await?;
    Ok(id)
}
