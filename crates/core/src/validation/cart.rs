//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::two_decimal_places;

/// One line in a cart, snapshotting the product at the time it was added.
///
/// Accepts `qty` as an alias for `quantity` on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CartItem {
    #[validate(length(min = 1, message = "Product is required"))]
    pub product_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    #[serde(alias = "qty")]
    #[validate(range(min = 0, message = "Quantity must be a non-negative number"))]
    pub quantity: i32,
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
    #[validate(custom(function = "two_decimal_places"))]
    pub price: Decimal,
}
