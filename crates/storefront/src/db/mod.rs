//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts, saved shipping address and payment method
//! - `products` - Catalog, with aggregate rating and review count
//! - `reviews` - One review per user and product
//! - `carts` - Cart lines as JSONB, keyed by the session cart id
//! - `orders` / `order_items` - Placed orders and their frozen lines
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p boutique-cli -- migrate
//! ```
//!
//! Queries are checked at runtime (`sqlx::query_as` + `FromRow`), so building
//! the workspace never needs a live database.

pub mod carts;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use boutique_core::ValidationFailure;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::{ProductFilter, ProductRepository};
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Not enough stock left to fulfil an order line.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// A write payload failed its schema.
    #[error("{0}")]
    Invalid(#[from] ValidationFailure),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-violation to [`RepositoryError::Conflict`], passing other
/// errors through.
pub(crate) fn conflict_on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(message.to_owned());
        }
        RepositoryError::Database(e)
    }
}

/// Clamp a 1-based page number so its row offset fits in an `i64`.
///
/// Returns `(page, offset)`.
#[must_use]
pub fn page_offset(page: i64, page_size: i64) -> (i64, i64) {
    let page_size = page_size.max(1);
    let page = page.clamp(1, i64::MAX / page_size);
    (page, (page - 1) * page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 12), (1, 0));
        assert_eq!(page_offset(3, 12), (3, 24));
        assert_eq!(page_offset(0, 12), (1, 0));
        assert_eq!(page_offset(-5, 12), (1, 0));
    }

    #[test]
    fn test_page_offset_huge_page_does_not_overflow() {
        let (page, offset) = page_offset(i64::MAX, 12);
        assert_eq!(page, i64::MAX / 12);
        assert_eq!(offset, (i64::MAX / 12 - 1) * 12);
        assert!(offset >= 0);
    }
}
