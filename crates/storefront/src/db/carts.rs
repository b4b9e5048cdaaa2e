//! Cart repository for database operations.
//!
//! Cart lines are stored as a JSONB array of [`CartItem`]; totals are derived
//! on read.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use boutique_core::validation::CartItem;
use boutique_core::{CartId, UserId};

use super::RepositoryError;
use crate::models::cart::Cart;

#[derive(FromRow)]
struct CartRow {
    id: CartId,
    session_cart_id: String,
    user_id: Option<UserId>,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.id,
            session_cart_id: row.session_cart_id,
            user_id: row.user_id,
            items: row.items.0,
            created_at: row.created_at,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the cart for a session cart id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or the stored
    /// items are not valid cart lines.
    pub async fn get_by_session(
        &self,
        session_cart_id: &str,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, session_cart_id, user_id, items, created_at
            FROM carts
            WHERE session_cart_id = $1
            ",
        )
        .bind(session_cart_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Create or overwrite the cart for a session cart id.
    ///
    /// An existing owner is kept when `user_id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(
        &self,
        session_cart_id: &str,
        user_id: Option<UserId>,
        items: &[CartItem],
    ) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO carts (session_cart_id, user_id, items)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_cart_id) DO UPDATE
            SET items = EXCLUDED.items,
                user_id = COALESCE(EXCLUDED.user_id, carts.user_id)
            RETURNING id, session_cart_id, user_id, items, created_at
            ",
        )
        .bind(session_cart_id)
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Attach an anonymous cart to a user after sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn claim(&self, session_cart_id: &str, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET user_id = $2 WHERE session_cart_id = $1")
            .bind(session_cart_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
