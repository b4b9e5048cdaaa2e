//! Checkout route handlers: shipping address, payment method, place order.
//!
//! Each step saves onto the user record. The place-order page redirects to
//! the first incomplete step.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::validation::{PaymentMethodForm, ShippingAddress, Validated};
use boutique_core::{DEFAULT_PAYMENT_METHOD, PaymentMethod, ValidationFailure};

use crate::db::{OrderRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb, format_error};
use crate::filters;
use crate::form::FormState;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CurrentUser, User};
use crate::services::checkout::prepare_order;
use crate::state::AppState;

use super::Layout;
use super::cart::{CartLineView, TotalsView, load_cart};

/// A payment method option on the payment form.
#[derive(Debug, Clone)]
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

/// Shipping address page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/shipping.html")]
pub struct ShippingTemplate {
    pub layout: Layout,
    pub address: ShippingAddress,
    pub form: FormState,
}

/// Payment method page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub layout: Layout,
    pub options: Vec<PaymentOption>,
    pub form: FormState,
}

/// Order review page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/place_order.html")]
pub struct PlaceOrderTemplate {
    pub layout: Layout,
    pub address: ShippingAddress,
    pub payment_method: String,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    pub form: FormState,
}

/// Load the full record of the signed-in user.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the account no longer exists.
pub async fn load_user(state: &AppState, user: &CurrentUser) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
}

fn blank_address(name: &str) -> ShippingAddress {
    ShippingAddress {
        full_name: name.to_owned(),
        street_address: String::new(),
        city: String::new(),
        postal_code: String::new(),
        country: String::new(),
        lat: None,
        lng: None,
    }
}

fn payment_options(selected: &str) -> Vec<PaymentOption> {
    PaymentMethod::ALL
        .into_iter()
        .map(|method| PaymentOption {
            value: method.as_str(),
            label: method.label(),
            checked: method.as_str() == selected,
        })
        .collect()
}

// =============================================================================
// Shipping
// =============================================================================

/// Display the shipping address form.
pub async fn shipping_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    session: Session,
) -> Result<Response> {
    if load_cart(&state, &session).await?.is_none_or(|c| c.is_empty()) {
        return Ok(Redirect::to("/cart").into_response());
    }
    let user = load_user(&state, &current).await?;
    let address = user
        .address
        .unwrap_or_else(|| blank_address(&user.name));

    Ok(ShippingTemplate {
        layout: Layout::new(&state, Some(current), "Shipping address"),
        address,
        form: FormState::Idle,
    }
    .into_response())
}

/// Save the shipping address and continue to payment.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn save_shipping(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Form(address): Form<ShippingAddress>,
) -> Result<Response> {
    let address = match address.clone().validated() {
        Ok(address) => address,
        Err(failure) => {
            let template = ShippingTemplate {
                layout: Layout::new(&state, Some(current), "Shipping address"),
                address,
                form: FormState::failure(format_error(&failure)),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
        }
    };

    UserRepository::new(state.pool())
        .update_address(current.id, &address)
        .await?;
    Ok(Redirect::to("/checkout/payment").into_response())
}

// =============================================================================
// Payment
// =============================================================================

/// Display the payment method form.
pub async fn payment_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let user = load_user(&state, &current).await?;
    if user.address.is_none() {
        return Ok(Redirect::to("/checkout/shipping").into_response());
    }
    let selected = user.payment_method.unwrap_or(DEFAULT_PAYMENT_METHOD);

    Ok(PaymentTemplate {
        layout: Layout::new(&state, Some(current), "Payment method"),
        options: payment_options(selected.as_str()),
        form: FormState::Idle,
    }
    .into_response())
}

/// Save the payment method and continue to the order review.
#[instrument(skip_all, fields(user_id = %current.id, method = %form.kind))]
pub async fn save_payment(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response> {
    let method = form
        .clone()
        .validated()
        .and_then(|f| {
            f.kind
                .parse::<PaymentMethod>()
                .map_err(|e| ValidationFailure::field("type", e.to_string()))
        });

    let method = match method {
        Ok(method) => method,
        Err(failure) => {
            let template = PaymentTemplate {
                layout: Layout::new(&state, Some(current), "Payment method"),
                options: payment_options(&form.kind),
                form: FormState::failure(format_error(&failure)),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
        }
    };

    UserRepository::new(state.pool())
        .update_payment_method(current.id, method)
        .await?;
    Ok(Redirect::to("/checkout/place-order").into_response())
}

// =============================================================================
// Place order
// =============================================================================

/// Display the order review page.
pub async fn review_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    session: Session,
) -> Result<Response> {
    let user = load_user(&state, &current).await?;
    let cart = load_cart(&state, &session).await?;
    if let Err(step) = prepare_order(&user, cart.as_ref()) {
        return Ok(Redirect::to(step.path()).into_response());
    }
    Ok(render_review(&state, current, &user, cart.as_ref(), FormState::Idle, StatusCode::OK))
}

/// Create the order from the cart and show it.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    session: Session,
) -> Result<Response> {
    let user = load_user(&state, &current).await?;
    let cart = load_cart(&state, &session).await?;
    let (order, cart_ref) = match (prepare_order(&user, cart.as_ref()), cart.as_ref()) {
        (Ok(order), Some(cart)) => (order, cart),
        (Err(step), _) => return Ok(Redirect::to(step.path()).into_response()),
        (Ok(_), None) => return Ok(Redirect::to("/cart").into_response()),
    };

    match OrderRepository::new(state.pool()).place(&order, cart_ref).await {
        Ok(order_id) => {
            add_breadcrumb(
                "checkout",
                "Order placed",
                &[("order_id", order_id.to_string())],
            );
            Ok(Redirect::to(&format!("/orders/{order_id}")).into_response())
        }
        Err(err @ (RepositoryError::OutOfStock(_) | RepositoryError::Invalid(_))) => {
            let status = if matches!(err, RepositoryError::OutOfStock(_)) {
                StatusCode::CONFLICT
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            Ok(render_review(
                &state,
                current,
                &user,
                Some(cart_ref),
                FormState::failure(format_error(&err)),
                status,
            ))
        }
        Err(e) => Err(e.into()),
    }
}

fn render_review(
    state: &AppState,
    current: CurrentUser,
    user: &User,
    cart: Option<&Cart>,
    form: FormState,
    status: StatusCode,
) -> Response {
    let items = cart.map_or(&[][..], |c| c.items.as_slice());
    let template = PlaceOrderTemplate {
        layout: Layout::new(state, Some(current), "Place order"),
        address: user
            .address
            .clone()
            .unwrap_or_else(|| blank_address(&user.name)),
        payment_method: user
            .payment_method
            .map_or_else(String::new, |m| m.label().to_owned()),
        lines: items
            .iter()
            .map(|item| CartLineView::new(item, state.currency()))
            .collect(),
        totals: TotalsView::for_items(items, state.currency()),
        form,
    };
    (status, template).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_options_mark_selected() {
        let options = payment_options("Stripe");
        assert_eq!(options.len(), 3);
        assert!(options.iter().any(|o| o.value == "Stripe" && o.checked));
        assert_eq!(options.iter().filter(|o| o.checked).count(), 1);
    }

    #[test]
    fn test_blank_address_keeps_name() {
        let address = blank_address("Alice Martin");
        assert_eq!(address.full_name, "Alice Martin");
        assert!(address.city.is_empty());
    }
}
