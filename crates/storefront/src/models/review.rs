//! Review domain type.

use chrono::{DateTime, Utc};

use boutique_core::{ProductId, ReviewId, UserId};

/// A customer review, joined with its author's display name.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub product_id: ProductId,
    pub rating: i32,
    pub title: String,
    pub description: String,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}
