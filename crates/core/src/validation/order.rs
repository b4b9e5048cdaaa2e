//! Checkout schemas: shipping address, payment method and orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{rule_error, two_decimal_places};
use crate::types::{OrderId, PaymentMethod, ProductId, UserId};

/// Where an order ships. `lat`/`lng` are optional map coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ShippingAddress {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub full_name: String,
    #[validate(length(min = 3, message = "Address must be at least 3 characters"))]
    pub street_address: String,
    #[validate(length(min = 3, message = "City must be at least 3 characters"))]
    pub city: String,
    #[validate(length(min = 3, message = "Postal code must be at least 3 characters"))]
    pub postal_code: String,
    #[validate(length(min = 3, message = "Country must be at least 3 characters"))]
    pub country: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentMethodForm {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Payment method is required"))]
    #[validate(custom(function = "accepted_payment_method"))]
    pub kind: String,
}

/// Result reported by a payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub email_address: String,
    pub price_paid: String,
}

/// A new order header. Items are inserted separately as [`InsertOrderItem`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InsertOrder {
    pub user_id: UserId,
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
    #[validate(length(min = 1, message = "Payment method is required"))]
    #[validate(custom(function = "accepted_payment_method"))]
    pub payment_method: String,
    #[serde(default)]
    #[validate(nested)]
    pub payment_result: Option<PaymentResult>,
    #[validate(custom(function = "two_decimal_places"))]
    pub items_price: Decimal,
    #[validate(custom(function = "two_decimal_places"))]
    pub shipping_price: Decimal,
    #[validate(custom(function = "two_decimal_places"))]
    pub tax_price: Decimal,
    #[validate(custom(function = "two_decimal_places"))]
    pub total_price: Decimal,
}

/// One line of an order, copied from the cart.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InsertOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom(function = "two_decimal_places"))]
    pub price: Decimal,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
}

fn accepted_payment_method(kind: &str) -> Result<(), ValidationError> {
    if kind.is_empty() || kind.parse::<PaymentMethod>().is_ok() {
        Ok(())
    } else {
        Err(rule_error("payment_method", "Invalid payment method"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validation::Validated;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Jane Doe".to_owned(),
            street_address: "12 rue de la Paix".to_owned(),
            city: "Paris".to_owned(),
            postal_code: "75002".to_owned(),
            country: "France".to_owned(),
            lat: None,
            lng: None,
        }
    }

    fn order(address: ShippingAddress, method: &str) -> InsertOrder {
        InsertOrder {
            user_id: UserId::generate(),
            shipping_address: address,
            payment_method: method.to_owned(),
            payment_result: None,
            items_price: Decimal::new(11_998, 2),
            shipping_price: Decimal::ZERO,
            tax_price: Decimal::new(1800, 2),
            total_price: Decimal::new(13_798, 2),
        }
    }

    #[test]
    fn test_valid_order() {
        assert!(order(address(), "PayPal").validated().is_ok());
    }

    #[test]
    fn test_nested_address_paths() {
        let mut bad = address();
        bad.city = "X".to_owned();
        let failure = order(bad, "Stripe").validated().unwrap_err();
        assert_eq!(
            failure.message_for("shipping_address.city"),
            Some("City must be at least 3 characters")
        );
    }

    #[test]
    fn test_unknown_payment_method() {
        let failure = order(address(), "Bitcoin").validated().unwrap_err();
        assert_eq!(
            failure.message_for("payment_method"),
            Some("Invalid payment method")
        );
    }

    #[test]
    fn test_payment_method_form_uses_type_key() {
        let form: PaymentMethodForm =
            serde_json::from_value(serde_json::json!({ "type": "CashOnDelivery" })).unwrap();
        assert!(form.validated().is_ok());

        let form: PaymentMethodForm =
            serde_json::from_value(serde_json::json!({ "type": "Cheque" })).unwrap();
        let failure = form.validated().unwrap_err();
        assert!(failure.to_string().contains("Invalid payment method"));
    }

    #[test]
    fn test_empty_payment_method_reports_required() {
        let form = PaymentMethodForm {
            kind: String::new(),
        };
        let failure = form.validated().unwrap_err();
        assert_eq!(failure.errors().len(), 1);
        assert!(failure.to_string().contains("Payment method is required"));
    }

    #[test]
    fn test_order_without_payment_method() {
        let failure = order(address(), "").validated().unwrap_err();
        assert_eq!(
            failure.message_for("payment_method"),
            Some("Payment method is required")
        );
    }

    #[test]
    fn test_order_item_quantity() {
        let item = InsertOrderItem {
            order_id: OrderId::generate(),
            product_id: ProductId::generate(),
            quantity: 0,
            price: Decimal::new(1000, 2),
            name: "Shirt".to_owned(),
            slug: "shirt".to_owned(),
            image: "/a.jpg".to_owned(),
        };
        let failure = item.validated().unwrap_err();
        assert!(failure.has_path("quantity"));
    }
}
