//! Admin route handlers: products, users and order fulfilment.
//!
//! Every handler requires the admin role via [`RequireAdmin`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use boutique_core::validation::{
    Coerced, InsertProduct, PaymentResult, UpdateProduct, UpdateUserForm, Validated,
};
use boutique_core::{
    OrderId, PaymentMethod, ProductId, UserId, ValidationFailure, canonical_amount,
};

use crate::db::{OrderRepository, ProductRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result, format_error};
use crate::filters;
use crate::form::FormState;
use crate::middleware::RequireAdmin;
use crate::models::{Product, Role, User};
use crate::state::AppState;

use super::Layout;

// =============================================================================
// Products
// =============================================================================

/// Product form post. Numbers stay text until coerced; images are one URL
/// per line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub images: String,
    #[serde(default)]
    pub is_featured: Option<String>,
    #[serde(default)]
    pub banner: String,
    #[serde(default)]
    pub price: String,
}

impl ProductSubmission {
    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            stock: product.stock.to_string(),
            images: product.images.join("\n"),
            is_featured: product.is_featured.then(|| "on".to_owned()),
            banner: product.banner.clone().unwrap_or_default(),
            price: canonical_amount(product.price),
        }
    }

    /// Whether the featured checkbox is ticked.
    #[must_use]
    pub const fn featured(&self) -> bool {
        self.is_featured.is_some()
    }

    fn to_insert(&self) -> InsertProduct {
        let banner = self.banner.trim();
        InsertProduct {
            name: self.name.trim().to_owned(),
            slug: self.slug.trim().to_owned(),
            category: self.category.trim().to_owned(),
            brand: self.brand.trim().to_owned(),
            description: self.description.trim().to_owned(),
            stock: Coerced::parse(&self.stock),
            images: self
                .images
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            is_featured: self.featured(),
            banner: (!banner.is_empty()).then(|| banner.to_owned()),
            price: Coerced::parse(&self.price),
        }
    }
}

/// Product create/edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub heading: String,
    pub action: String,
    pub values: ProductSubmission,
    pub form: FormState,
}

fn product_form(
    state: &AppState,
    admin: RequireAdmin,
    product_id: Option<ProductId>,
    values: ProductSubmission,
    form: FormState,
) -> ProductFormTemplate {
    let (heading, action) = match product_id {
        Some(id) => ("Edit product", format!("/admin/products/{id}/edit")),
        None => ("New product", "/admin/products/new".to_owned()),
    };
    ProductFormTemplate {
        layout: Layout::new(state, Some(admin.0), heading),
        heading: heading.to_owned(),
        action,
        values,
        form,
    }
}

/// Validate a product edit. The form shows product fields inline, so
/// their errors are reported without the `product.` prefix.
fn validate_update(update: UpdateProduct) -> std::result::Result<UpdateProduct, ValidationFailure> {
    update.validated().map_err(|failure| failure.unnest("product"))
}

/// Errors a product form shows inline rather than failing the request.
const fn is_form_error(err: &RepositoryError) -> bool {
    matches!(err, RepositoryError::Invalid(_) | RepositoryError::Conflict(_))
}

/// Display an empty product form.
pub async fn new_product_page(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> impl IntoResponse {
    product_form(
        &state,
        admin,
        None,
        ProductSubmission::default(),
        FormState::Idle,
    )
}

/// Create a product.
#[instrument(skip_all, fields(admin_id = %admin.0.id, slug = %values.slug))]
pub async fn create_product(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Form(values): Form<ProductSubmission>,
) -> Result<Response> {
    match ProductRepository::new(state.pool())
        .create(&values.to_insert())
        .await
    {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product created");
            Ok(Redirect::to(&format!("/products/{}", product.slug)).into_response())
        }
        Err(err) if is_form_error(&err) => {
            let form = FormState::failure(format_error(&err));
            let template = product_form(&state, admin, None, values, form);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Display the edit form for a product.
pub async fn edit_product_page(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(product_form(
        &state,
        admin,
        Some(id),
        ProductSubmission::from_product(&product),
        FormState::Idle,
    ))
}

/// Update a product.
#[instrument(skip_all, fields(admin_id = %admin.0.id, product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Form(values): Form<ProductSubmission>,
) -> Result<Response> {
    let update = UpdateProduct {
        id: id.to_string(),
        product: values.to_insert(),
    };

    let result = match validate_update(update) {
        Ok(update) => {
            ProductRepository::new(state.pool())
                .update(id, &update.product)
                .await
        }
        Err(failure) => Err(RepositoryError::Invalid(failure)),
    };

    match result {
        Ok(product) => {
            tracing::info!("Product updated");
            Ok(Redirect::to(&format!("/products/{}", product.slug)).into_response())
        }
        Err(err) if is_form_error(&err) => {
            let form = FormState::failure(format_error(&err));
            let template = product_form(&state, admin, Some(id), values, form);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Users
// =============================================================================

/// A role option on the user form.
#[derive(Debug, Clone)]
pub struct RoleOption {
    pub value: &'static str,
    pub selected: bool,
}

/// User edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/user_form.html")]
pub struct UserFormTemplate {
    pub layout: Layout,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleOption>,
    pub form: FormState,
}

fn role_options(selected: &str) -> Vec<RoleOption> {
    [Role::User, Role::Admin]
        .into_iter()
        .map(|role| RoleOption {
            value: role.as_str(),
            selected: role.as_str() == selected,
        })
        .collect()
}

fn user_form(
    state: &AppState,
    admin: RequireAdmin,
    user: &User,
    form: FormState,
) -> UserFormTemplate {
    UserFormTemplate {
        layout: Layout::new(state, Some(admin.0), "Edit user"),
        user_id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        roles: role_options(user.role.as_str()),
        form,
    }
}

/// Check an admin user edit and resolve its role.
fn parse_user_update(
    id: UserId,
    form: UpdateUserForm,
) -> std::result::Result<(UpdateUserForm, Role), ValidationFailure> {
    let form = form.validated()?;
    if form.id != id.to_string() {
        return Err(ValidationFailure::field("id", "Id does not match the edited user"));
    }
    let role = form
        .role
        .parse::<Role>()
        .map_err(|e| ValidationFailure::field("role", e.to_string()))?;
    Ok((form, role))
}

/// Display the edit form for a user.
pub async fn edit_user_page(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(user_form(&state, admin, &user, FormState::Idle))
}

/// Update a user's name, email and role.
#[instrument(skip_all, fields(admin_id = %admin.0.id, user_id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<UpdateUserForm>,
) -> Result<Response> {
    let result = match parse_user_update(id, form.clone()) {
        Ok((valid, role)) => {
            UserRepository::new(state.pool())
                .update(id, &valid.name, &valid.email, role)
                .await
        }
        Err(failure) => Err(RepositoryError::Invalid(failure)),
    };

    let outcome = FormState::resolve(&result, "User updated successfully");
    match result {
        Ok(user) => {
            tracing::info!(role = %user.role, "User updated");
            Ok(user_form(&state, admin, &user, outcome).into_response())
        }
        Err(err) if is_form_error(&err) => {
            let template = UserFormTemplate {
                layout: Layout::new(&state, Some(admin.0), "Edit user"),
                user_id: id.to_string(),
                roles: role_options(&form.role),
                name: form.name,
                email: form.email,
                form: outcome,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Record payment collected for a cash-on-delivery order.
#[instrument(skip_all, fields(admin_id = %admin.0.id, order_id = %id))]
pub async fn mark_paid(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.payment_method != PaymentMethod::CashOnDelivery {
        return Err(AppError::BadRequest(
            "Only cash on delivery orders can be marked paid".to_string(),
        ));
    }

    let receipt = PaymentResult {
        id: order.id.to_string(),
        status: "COMPLETED".to_owned(),
        email_address: admin.0.email.clone(),
        price_paid: canonical_amount(order.total_price),
    };
    orders.mark_paid(id, &receipt).await?;

    tracing::info!("Order marked paid");
    Ok(Redirect::to(&format!("/orders/{id}")))
}

/// Mark a paid order delivered.
#[instrument(skip_all, fields(admin_id = %admin.0.id, order_id = %id))]
pub async fn mark_delivered(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    OrderRepository::new(state.pool()).mark_delivered(id).await?;
    tracing::info!("Order marked delivered");
    Ok(Redirect::to(&format!("/orders/{id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn submission() -> ProductSubmission {
        ProductSubmission {
            name: "Linen Shirt".to_string(),
            slug: "linen-shirt".to_string(),
            category: "Shirts".to_string(),
            brand: "Atelier".to_string(),
            description: "A breathable linen shirt".to_string(),
            stock: "12".to_string(),
            images: "/images/linen-1.jpg\n\n /images/linen-2.jpg \n".to_string(),
            is_featured: Some("on".to_string()),
            banner: "  ".to_string(),
            price: "49.9".to_string(),
        }
    }

    #[test]
    fn test_submission_to_insert() {
        let insert = submission().to_insert();
        assert_eq!(
            insert.images,
            vec!["/images/linen-1.jpg", "/images/linen-2.jpg"]
        );
        assert!(insert.is_featured);
        assert_eq!(insert.banner, None);
        assert_eq!(insert.stock.value(), Some(12));
        assert_eq!(insert.price.value(), Some(Decimal::new(499, 1)));
        assert!(insert.validated().is_ok());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let mut values = submission();
        values.stock = "-1".to_string();
        let failure = values.to_insert().validated().unwrap_err();
        assert!(failure.has_path("stock"));
    }

    #[test]
    fn test_update_errors_use_form_field_paths() {
        let mut values = submission();
        values.name = "Ab".to_string();
        let update = UpdateProduct {
            id: ProductId::generate().to_string(),
            product: values.to_insert(),
        };
        let failure = validate_update(update).unwrap_err();
        assert_eq!(
            failure.to_string(),
            "name: Name must be at least 3 characters"
        );
    }

    #[test]
    fn test_parse_user_update() {
        let id = UserId::generate();
        let form = UpdateUserForm {
            id: id.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: "admin".to_string(),
        };
        let (_, role) = parse_user_update(id, form.clone()).unwrap();
        assert_eq!(role, Role::Admin);

        let failure = parse_user_update(UserId::generate(), form.clone()).unwrap_err();
        assert!(failure.has_path("id"));

        let bad_role = UpdateUserForm {
            role: "owner".to_string(),
            ..form
        };
        assert!(parse_user_update(id, bad_role).unwrap_err().has_path("role"));
    }

    #[test]
    fn test_role_options() {
        let options = role_options("admin");
        assert_eq!(options.len(), 2);
        assert!(options.iter().any(|o| o.value == "admin" && o.selected));
    }
}
