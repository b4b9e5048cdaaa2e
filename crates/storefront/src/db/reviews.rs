//! Review repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use boutique_core::validation::InsertReview;
use boutique_core::{ProductId, ReviewId, UserId, ValidationFailure};

use super::RepositoryError;
use crate::models::review::Review;

#[derive(FromRow)]
struct ReviewRow {
    id: ReviewId,
    user_id: UserId,
    user_name: String,
    product_id: ProductId,
    rating: i32,
    title: String,
    description: String,
    is_verified_purchase: bool,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            product_id: row.product_id,
            rating: row.rating,
            title: row.title,
            description: row.description,
            is_verified_purchase: row.is_verified_purchase,
            created_at: row.created_at,
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT r.id, r.user_id, u.name AS user_name, r.product_id, r.rating, r.title,
                   r.description, r.is_verified_purchase, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Whether the user has a paid order containing the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_purchased(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        Ok(sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM order_items oi
                JOIN orders o ON o.id = oi.order_id
                WHERE o.user_id = $1 AND oi.product_id = $2 AND o.is_paid
            )
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?)
    }

    /// Insert a review, replacing the user's earlier review of the same
    /// product, then recompute the product's rating and review count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the review fails its schema.
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn upsert(&self, review: &InsertReview) -> Result<(), RepositoryError> {
        review.validate().map_err(ValidationFailure::from)?;
        let rating = review
            .rating
            .value()
            .ok_or_else(|| ValidationFailure::field("rating", "Rating must be a whole number"))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO reviews (user_id, product_id, rating, title, description, is_verified_purchase)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, product_id) DO UPDATE
            SET rating = EXCLUDED.rating,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                is_verified_purchase = EXCLUDED.is_verified_purchase,
                created_at = now()
            ",
        )
        .bind(review.user_id)
        .bind(review.product_id)
        .bind(rating)
        .bind(&review.title)
        .bind(&review.description)
        .bind(review.is_verified_purchase)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;

        sqlx::query(
            r"
            UPDATE products
            SET rating = COALESCE(
                    (SELECT ROUND(AVG(rating)::numeric, 2) FROM reviews WHERE product_id = $1), 0),
                num_reviews = (SELECT COUNT(*) FROM reviews WHERE product_id = $1)
            WHERE id = $1
            ",
        )
        .bind(review.product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
