//! Cart route handlers.
//!
//! The cart is keyed by an anonymous id stored in the session, assigned on
//! the first add. Lines carry a snapshot of name, image and price.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::ProductId;
use boutique_core::format::CurrencyFormatter;
use boutique_core::validation::CartItem;
use rust_decimal::Decimal;

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result, add_breadcrumb, format_error};
use crate::filters;
use crate::form::FormState;
use crate::middleware::{OptionalAuth, ensure_session_cart_id, session_cart_id};
use crate::models::{Cart, CurrentUser};
use crate::services::cart::{add_line, line_for, remove_one};
use crate::services::checkout::calculate_prices;
use crate::state::AppState;

use super::Layout;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

impl CartLineView {
    #[must_use]
    pub fn new(item: &CartItem, currency: &CurrencyFormatter) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: currency.format(item.price),
            subtotal: currency.format(item.price * Decimal::from(item.quantity)),
        }
    }
}

/// Formatted cart or order totals.
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub items_price: String,
    pub shipping_price: String,
    pub tax_price: String,
    pub total_price: String,
}

impl TotalsView {
    #[must_use]
    pub fn for_items(items: &[CartItem], currency: &CurrencyFormatter) -> Self {
        let prices = calculate_prices(items);
        Self {
            items_price: currency.format(prices.items_price),
            shipping_price: currency.format(prices.shipping_price),
            tax_price: currency.format(prices.tax_price),
            total_price: currency.format(prices.total_price),
        }
    }
}

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Remove-from-cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    pub is_empty: bool,
    pub form: FormState,
}

/// Load the cart attached to this session, if one exists.
///
/// # Errors
///
/// Returns an error if the session or database cannot be read.
pub async fn load_cart(state: &AppState, session: &Session) -> Result<Option<Cart>> {
    let Some(id) = session_cart_id(session).await? else {
        return Ok(None);
    };
    Ok(CartRepository::new(state.pool()).get_by_session(&id).await?)
}

/// Display the cart page.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Response> {
    let cart = load_cart(&state, &session).await?;
    Ok(render(&state, user, cart.as_ref(), FormState::Idle, StatusCode::OK))
}

/// Add a product to the cart.
#[instrument(skip_all, fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id: ProductId = form
        .product_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid product id".to_string()))?;
    let product = ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let cart = load_cart(&state, &session).await?;
    let mut items = cart.as_ref().map(|c| c.items.clone()).unwrap_or_default();

    let added = line_for(&product, form.quantity)
        .and_then(|line| add_line(&mut items, line, product.stock));
    if let Err(failure) = added {
        return Ok(render(
            &state,
            user,
            cart.as_ref(),
            FormState::failure(format_error(&failure)),
            StatusCode::UNPROCESSABLE_ENTITY,
        ));
    }

    let cart_id = ensure_session_cart_id(&session).await?;
    CartRepository::new(state.pool())
        .save(&cart_id, user.as_ref().map(|u| u.id), &items)
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product", product.slug.clone()),
            ("quantity", form.quantity.to_string()),
        ],
    );
    Ok(Redirect::to("/cart").into_response())
}

/// Remove one unit of a product from the cart.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let Some(cart) = load_cart(&state, &session).await? else {
        return Ok(Redirect::to("/cart").into_response());
    };

    let mut items = cart.items;
    if remove_one(&mut items, &form.product_id) {
        CartRepository::new(state.pool())
            .save(&cart.session_cart_id, None, &items)
            .await?;
    }
    Ok(Redirect::to("/cart").into_response())
}

fn render(
    state: &AppState,
    user: Option<CurrentUser>,
    cart: Option<&Cart>,
    form: FormState,
    status: StatusCode,
) -> Response {
    let items = cart.map_or(&[][..], |c| c.items.as_slice());
    let template = CartTemplate {
        layout: Layout::new(state, user, "Cart"),
        lines: items
            .iter()
            .map(|item| CartLineView::new(item, state.currency()))
            .collect(),
        totals: TotalsView::for_items(items, state.currency()),
        is_empty: items.is_empty(),
        form,
    };
    (status, template).into_response()
}

#[cfg(test)]
mod tests {
    use boutique_core::{CurrencyCode, Locale};

    use super::*;

    const USD: CurrencyFormatter = CurrencyFormatter::new(Locale::EnUs, CurrencyCode::USD);

    fn shirt(quantity: i32) -> CartItem {
        CartItem {
            product_id: ProductId::generate().to_string(),
            name: "Oxford Shirt".to_string(),
            slug: "oxford-shirt".to_string(),
            quantity,
            image: "/images/shirt.jpg".to_string(),
            price: Decimal::new(5999, 2),
        }
    }

    #[test]
    fn test_line_view_subtotal() {
        let view = CartLineView::new(&shirt(2), &USD);
        assert_eq!(view.price, "$59.99");
        assert_eq!(view.subtotal, "$119.98");
    }

    #[test]
    fn test_totals_free_shipping_over_threshold() {
        let totals = TotalsView::for_items(&[shirt(2)], &USD);
        assert_eq!(totals.items_price, "$119.98");
        assert_eq!(totals.shipping_price, "$0.00");
        assert_eq!(totals.tax_price, "$18.00");
        assert_eq!(totals.total_price, "$137.98");
    }

    #[test]
    fn test_totals_flat_shipping() {
        let totals = TotalsView::for_items(&[shirt(1)], &USD);
        assert_eq!(totals.shipping_price, "$10.00");
        assert_eq!(totals.total_price, "$78.99");
    }
}
