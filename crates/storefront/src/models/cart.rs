//! Cart domain type.

use chrono::{DateTime, Utc};

use boutique_core::validation::CartItem;
use boutique_core::{CartId, UserId};

use crate::services::checkout::{CheckoutPrices, calculate_prices};

/// A shopping cart, keyed by the session's cart id.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: CartId,
    pub session_cart_id: String,
    /// Set once the owner signs in.
    pub user_id: Option<UserId>,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Derived totals.
    #[must_use]
    pub fn prices(&self) -> CheckoutPrices {
        calculate_prices(&self.items)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
