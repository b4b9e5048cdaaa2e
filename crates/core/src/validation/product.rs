//! Catalog schemas: products and reviews.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::coerce::Coerced;
use super::{rule_error, two_decimal_places};
use crate::types::{ProductId, UserId};

/// Fields required to create a product. Rating, review count and creation
/// time are assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InsertProduct {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(length(min = 3, message = "Slug must be at least 3 characters"))]
    pub slug: String,
    #[validate(length(min = 3, message = "Category must be at least 3 characters"))]
    pub category: String,
    #[validate(length(min = 3, message = "Brand must be at least 3 characters"))]
    pub brand: String,
    #[validate(length(min = 3, message = "Description must be at least 3 characters"))]
    pub description: String,
    #[validate(custom(function = "non_negative_stock"))]
    pub stock: Coerced<i32>,
    #[validate(length(min = 1, message = "Product must have at least one image"))]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub banner: Option<String>,
    #[validate(custom(function = "coerced_price"))]
    pub price: Coerced<Decimal>,
}

/// [`InsertProduct`] plus the id of the product being edited.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
    #[validate(nested)]
    #[serde(flatten)]
    pub product: InsertProduct,
}

/// A customer review. The author is always the signed-in user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InsertReview {
    pub user_id: UserId,
    pub product_id: ProductId,
    #[validate(custom(function = "rating_in_range"))]
    pub rating: Coerced<i32>,
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 3, message = "Description must be at least 3 characters"))]
    pub description: String,
    #[serde(default)]
    pub is_verified_purchase: bool,
}

fn non_negative_stock(stock: &Coerced<i32>) -> Result<(), ValidationError> {
    match stock.value() {
        None => Err(rule_error("number", "Stock must be a number")),
        Some(n) if n < 0 => Err(rule_error("range", "Stock must be at least 0")),
        Some(_) => Ok(()),
    }
}

fn rating_in_range(rating: &Coerced<i32>) -> Result<(), ValidationError> {
    match rating.value() {
        None => Err(rule_error("number", "Rating must be a whole number")),
        Some(n) if n < 1 => Err(rule_error("range", "Rating must be at least 1")),
        Some(n) if n > 5 => Err(rule_error("range", "Rating must be at most 5")),
        Some(_) => Ok(()),
    }
}

fn coerced_price(price: &Coerced<Decimal>) -> Result<(), ValidationError> {
    price.value().map_or_else(
        || Err(rule_error("number", "Price must be a number")),
        |p| two_decimal_places(&p),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::validation::Validated;

    pub(crate) fn product() -> InsertProduct {
        InsertProduct {
            name: "Polo Sporting Stretch Shirt".to_owned(),
            slug: "polo-sporting-stretch-shirt".to_owned(),
            category: "Men's Dress Shirts".to_owned(),
            brand: "Polo".to_owned(),
            description: "Classic Polo style with modern comfort".to_owned(),
            stock: Coerced::Value(5),
            images: vec!["/images/sample-products/p1-1.jpg".to_owned()],
            is_featured: true,
            banner: None,
            price: Coerced::Value(Decimal::new(5999, 2)),
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(product().validated().is_ok());
    }

    #[test]
    fn test_price_with_one_decimal_is_canonicalized() {
        let mut p = product();
        p.price = Coerced::Value(Decimal::new(499, 1));
        assert!(p.validated().is_ok());
    }

    #[test]
    fn test_non_numeric_price() {
        let mut p = product();
        p.price = Coerced::parse("cheap");
        let failure = p.validated().unwrap_err();
        assert_eq!(failure.message_for("price"), Some("Price must be a number"));
    }

    #[test]
    fn test_negative_stock_and_missing_images() {
        let mut p = product();
        p.stock = Coerced::Value(-1);
        p.images.clear();
        let failure = p.validated().unwrap_err();
        assert_eq!(failure.message_for("stock"), Some("Stock must be at least 0"));
        assert!(failure.has_path("images"));
    }

    #[test]
    fn test_stock_coerced_from_json_string() {
        let json = serde_json::json!({
            "name": "Brooks Brothers Long Sleeved Shirt",
            "slug": "brooks-brothers-long-sleeved-shirt",
            "category": "Men's Dress Shirts",
            "brand": "Brooks Brothers",
            "description": "Timeless style and premium comfort",
            "stock": "10",
            "images": ["/images/sample-products/p2-1.jpg"],
            "price": "85.90"
        });
        let p: InsertProduct = serde_json::from_value(json).unwrap();
        assert_eq!(p.stock.value(), Some(10));
        assert!(!p.is_featured);
        assert!(p.validated().is_ok());
    }

    #[test]
    fn test_update_product_nests_paths() {
        let mut inner = product();
        inner.name = "X".to_owned();
        let update = UpdateProduct {
            id: String::new(),
            product: inner,
        };
        let failure = update.validated().unwrap_err();
        assert!(failure.has_path("id"));
        assert!(failure.has_path("product.name"));
    }

    fn review(rating: Coerced<i32>) -> InsertReview {
        InsertReview {
            user_id: UserId::generate(),
            product_id: ProductId::generate(),
            rating,
            title: "Great shirt".to_owned(),
            description: "Fits well".to_owned(),
            is_verified_purchase: false,
        }
    }

    #[test]
    fn test_review_rating_bounds() {
        assert!(review(Coerced::Value(1)).validated().is_ok());
        assert!(review(Coerced::Value(5)).validated().is_ok());
        let low = review(Coerced::Value(0)).validated().unwrap_err();
        assert_eq!(low.message_for("rating"), Some("Rating must be at least 1"));
        let high = review(Coerced::Value(6)).validated().unwrap_err();
        assert_eq!(high.message_for("rating"), Some("Rating must be at most 5"));
        assert!(review(Coerced::parse("4.5")).validated().is_err());
    }
}
