//! Order detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;

use boutique_core::format::{CurrencyFormatter, format_date_time, format_id};
use boutique_core::validation::ShippingAddress;
use boutique_core::{Locale, OrderId, PaymentMethod};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderItem};
use crate::state::AppState;

use super::Layout;
use super::cart::TotalsView;

/// Order line display data for templates.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub slug: String,
    pub image: String,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

impl OrderLineView {
    fn new(item: &OrderItem, currency: &CurrencyFormatter) -> Self {
        Self {
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: currency.format(item.price),
            subtotal: currency.format(item.price * Decimal::from(item.quantity)),
        }
    }
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub short_id: String,
    pub placed_at: String,
    pub address: ShippingAddress,
    pub payment_method: String,
    pub cash_on_delivery: bool,
    pub paid_at: Option<String>,
    pub delivered_at: Option<String>,
    pub lines: Vec<OrderLineView>,
    pub totals: TotalsView,
}

impl OrderView {
    #[must_use]
    pub fn new(order: &Order, currency: &CurrencyFormatter, locale: Locale) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: format_id(&order.id.to_string()),
            placed_at: format_date_time(&order.created_at, locale).date_time,
            address: order.shipping_address.clone(),
            payment_method: order.payment_method.label().to_owned(),
            cash_on_delivery: order.payment_method == PaymentMethod::CashOnDelivery,
            paid_at: order
                .paid_at
                .map(|at| format_date_time(&at, locale).date_time),
            delivered_at: order
                .delivered_at
                .map(|at| format_date_time(&at, locale).date_time),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView::new(item, currency))
                .collect(),
            totals: TotalsView {
                items_price: currency.format(order.items_price),
                shipping_price: currency.format(order.shipping_price),
                tax_price: currency.format(order.tax_price),
                total_price: currency.format(order.total_price),
            },
        }
    }
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: Layout,
    pub order: OrderView,
}

/// Display an order to its owner or an admin.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    // Other users' orders look missing rather than forbidden.
    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    let view = OrderView::new(&order, state.currency(), state.locale());
    Ok(OrderShowTemplate {
        layout: Layout::new(&state, Some(user), format!("Order {}", view.short_id)),
        order: view,
    })
}
