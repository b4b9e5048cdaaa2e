//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page (featured + latest)
//!
//! # Products
//! GET  /products?q=&category=&page=   - Product listing
//! GET  /products/{slug}               - Product detail with reviews
//! POST /products/{slug}/reviews       - Add or replace own review (auth)
//!
//! # Cart
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add a line
//! POST /cart/remove                   - Remove one unit
//!
//! # Checkout (auth)
//! GET|POST /checkout/shipping         - Shipping address
//! GET|POST /checkout/payment          - Payment method
//! GET|POST /checkout/place-order      - Review and place order
//!
//! # Orders and account (auth)
//! GET  /orders/{id}                   - Order detail (owner or admin)
//! GET  /account/orders                - Order history
//! GET|POST /account/profile           - Profile
//!
//! # Auth
//! GET|POST /auth/sign-in
//! GET|POST /auth/sign-up
//! POST /auth/sign-out
//!
//! # Admin
//! GET|POST /admin/products/new
//! GET|POST /admin/products/{id}/edit
//! GET|POST /admin/users/{id}/edit
//! POST /admin/orders/{id}/paid
//! POST /admin/orders/{id}/delivered
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::models::CurrentUser;
use crate::state::AppState;

/// Shared page chrome: shop name, page title and the signed-in user.
#[derive(Debug, Clone)]
pub struct Layout {
    pub app_name: String,
    pub title: String,
    pub user: Option<CurrentUser>,
}

impl Layout {
    #[must_use]
    pub fn new(state: &AppState, user: Option<CurrentUser>, title: impl Into<String>) -> Self {
        Self {
            app_name: state.config().app_name.clone(),
            title: title.into(),
            user,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/reviews", post(products::create_review))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shipping",
            get(checkout::shipping_page).post(checkout::save_shipping),
        )
        .route(
            "/payment",
            get(checkout::payment_page).post(checkout::save_payment),
        )
        .route(
            "/place-order",
            get(checkout::review_page).post(checkout::place_order),
        )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route(
            "/profile",
            get(account::profile_page).post(account::update_profile),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in_page).post(auth::sign_in))
        .route("/sign-up", get(auth::sign_up_page).post(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products/new",
            get(admin::new_product_page).post(admin::create_product),
        )
        .route(
            "/products/{id}/edit",
            get(admin::edit_product_page).post(admin::update_product),
        )
        .route(
            "/users/{id}/edit",
            get(admin::edit_user_page).post(admin::update_user),
        )
        .route("/orders/{id}/paid", post(admin::mark_paid))
        .route("/orders/{id}/delivered", post(admin::mark_delivered))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders/{id}", get(orders::show))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}
