//! Checkout pricing and order preparation.

use rust_decimal::Decimal;

use boutique_core::to_money_scale;
use boutique_core::validation::{CartItem, InsertOrder};

use crate::models::cart::Cart;
use crate::models::user::User;

/// Orders above this items total ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping fee below the threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Tax rate applied to the items total (15%).
pub const TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Derived cart and order totals, each with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPrices {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

/// Compute totals for a set of cart lines.
#[must_use]
pub fn calculate_prices(items: &[CartItem]) -> CheckoutPrices {
    let items_price = to_money_scale(
        items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum(),
    );
    let shipping_price = to_money_scale(if items_price > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    });
    let tax_price = to_money_scale(items_price * TAX_RATE);
    let total_price = to_money_scale(items_price + shipping_price + tax_price);

    CheckoutPrices {
        items_price,
        shipping_price,
        tax_price,
        total_price,
    }
}

/// The checkout step a shopper must complete before an order can be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingStep {
    Cart,
    Shipping,
    Payment,
}

impl MissingStep {
    /// Page that completes the step.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Cart => "/cart",
            Self::Shipping => "/checkout/shipping",
            Self::Payment => "/checkout/payment",
        }
    }
}

/// Build the order header for `user`'s cart.
///
/// # Errors
///
/// Returns the first missing checkout step: an empty cart, no saved shipping
/// address, or no saved payment method.
pub fn prepare_order(user: &User, cart: Option<&Cart>) -> Result<InsertOrder, MissingStep> {
    let cart = cart.filter(|c| !c.is_empty()).ok_or(MissingStep::Cart)?;
    let address = user.address.clone().ok_or(MissingStep::Shipping)?;
    let method = user.payment_method.ok_or(MissingStep::Payment)?;
    let prices = cart.prices();

    Ok(InsertOrder {
        user_id: user.id,
        shipping_address: address,
        payment_method: method.as_str().to_owned(),
        payment_result: None,
        items_price: prices.items_price,
        shipping_price: prices.shipping_price,
        tax_price: prices.tax_price,
        total_price: prices.total_price,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use boutique_core::validation::ShippingAddress;
    use boutique_core::{CartId, PaymentMethod, UserId};

    use super::*;
    use crate::models::user::Role;

    fn item(price: Decimal, quantity: i32) -> CartItem {
        CartItem {
            product_id: "3f2b8c1e-4c4b-4d0e-9a43-1c2d3e4f5a6b".to_owned(),
            name: "Polo Sporting Stretch Shirt".to_owned(),
            slug: "polo-sporting-stretch-shirt".to_owned(),
            quantity,
            image: "/images/p1-1.jpg".to_owned(),
            price,
        }
    }

    #[test]
    fn test_small_order_pays_shipping() {
        let prices = calculate_prices(&[item(Decimal::new(4990, 2), 1)]);
        assert_eq!(prices.items_price.to_string(), "49.90");
        assert_eq!(prices.shipping_price.to_string(), "10.00");
        assert_eq!(prices.tax_price.to_string(), "7.49");
        assert_eq!(prices.total_price.to_string(), "67.39");
    }

    #[test]
    fn test_large_order_ships_free() {
        let prices = calculate_prices(&[item(Decimal::new(5999, 2), 2)]);
        assert_eq!(prices.items_price.to_string(), "119.98");
        assert_eq!(prices.shipping_price.to_string(), "0.00");
        assert_eq!(prices.tax_price.to_string(), "18.00");
        assert_eq!(prices.total_price.to_string(), "137.98");
    }

    #[test]
    fn test_exactly_threshold_pays_shipping() {
        let prices = calculate_prices(&[item(Decimal::new(100, 0), 1)]);
        assert_eq!(prices.shipping_price.to_string(), "10.00");
    }

    #[test]
    fn test_empty_cart_totals() {
        let prices = calculate_prices(&[]);
        assert_eq!(prices.items_price.to_string(), "0.00");
        assert_eq!(prices.total_price.to_string(), "10.00");
    }

    fn user(address: Option<ShippingAddress>, method: Option<PaymentMethod>) -> User {
        User {
            id: UserId::generate(),
            name: "Jane Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            role: Role::User,
            address,
            payment_method: method,
            created_at: Utc::now(),
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::generate(),
            session_cart_id: "session".to_owned(),
            user_id: None,
            items,
            created_at: Utc::now(),
        }
    }

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

    #[test]
    fn test_prepare_order_reports_missing_steps_in_order() {
        let full = cart(vec![item(Decimal::new(1000, 2), 1)]);
        let empty = cart(Vec::new());

        let shopper = user(None, None);
        assert_eq!(prepare_order(&shopper, None).unwrap_err(), MissingStep::Cart);
        assert_eq!(prepare_order(&shopper, Some(&empty)).unwrap_err(), MissingStep::Cart);
        assert_eq!(
            prepare_order(&shopper, Some(&full)).unwrap_err(),
            MissingStep::Shipping
        );

        let shopper = user(Some(address()), None);
        assert_eq!(
            prepare_order(&shopper, Some(&full)).unwrap_err(),
            MissingStep::Payment
        );
    }

    #[test]
    fn test_prepare_order_copies_prices() {
        let shopper = user(Some(address()), Some(PaymentMethod::Stripe));
        let order = prepare_order(&shopper, Some(&cart(vec![item(Decimal::new(1000, 2), 3)]))).unwrap();
        assert_eq!(order.payment_method, "Stripe");
        assert_eq!(order.items_price.to_string(), "30.00");
        assert_eq!(order.total_price.to_string(), "44.50");
    }
}
