//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use boutique_core::validation::{PaymentResult, ShippingAddress};
use boutique_core::{OrderId, PaymentMethod, ProductId, UserId};

/// A placed order with its lines.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_result: Option<PaymentResult>,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }
}

/// One line of an order, frozen at placement time.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
    pub name: String,
    pub slug: String,
    pub image: String,
}
