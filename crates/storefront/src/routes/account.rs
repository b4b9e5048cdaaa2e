//! Account route handlers: order history and profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::format::{format_date_time, format_id};
use boutique_core::validation::{UpdateProfileForm, Validated};

use crate::db::{OrderRepository, RepositoryError, UserRepository};
use crate::error::Result;
use crate::filters;
use crate::form::FormState;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

use super::Layout;
use super::checkout::load_user;

/// Order row in the history table.
#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub id: String,
    pub short_id: String,
    pub placed_at: String,
    pub total: String,
    pub paid_at: Option<String>,
    pub delivered_at: Option<String>,
}

/// Order history query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderSummaryView>,
    pub current_page: i64,
    pub total_pages: i64,
    pub previous_page: Option<i64>,
    pub next_page: Option<i64>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub form: FormState,
}

/// Display the signed-in user's order history.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let page = OrderRepository::new(state.pool())
        .list_for_user(user.id, query.page.unwrap_or(1), state.config().page_size)
        .await?;

    let locale = state.locale();
    let orders = page
        .items
        .iter()
        .map(|order| OrderSummaryView {
            id: order.id.to_string(),
            short_id: format_id(&order.id.to_string()),
            placed_at: format_date_time(&order.created_at, locale).date_only,
            total: state.currency().format(order.total_price),
            paid_at: order.paid_at.map(|at| format_date_time(&at, locale).date_only),
            delivered_at: order
                .delivered_at
                .map(|at| format_date_time(&at, locale).date_only),
        })
        .collect();

    Ok(OrdersTemplate {
        layout: Layout::new(&state, Some(user), "My orders"),
        orders,
        current_page: page.page,
        total_pages: page.total_pages,
        previous_page: page.has_previous().then(|| page.page - 1),
        next_page: page.has_next().then(|| page.page + 1),
    })
}

/// Display the profile form.
pub async fn profile_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let user = load_user(&state, &current).await?;
    Ok(ProfileTemplate {
        layout: Layout::new(&state, Some(current), "Profile"),
        name: user.name,
        email: user.email,
        form: FormState::Idle,
    })
}

/// Update the signed-in user's name and email.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    session: Session,
    Form(form): Form<UpdateProfileForm>,
) -> Result<Response> {
    let result = match form.clone().validated() {
        Ok(valid) => {
            UserRepository::new(state.pool())
                .update_profile(current.id, &valid.name, &valid.email)
                .await
        }
        Err(failure) => Err(RepositoryError::Invalid(failure)),
    };

    let outcome = FormState::resolve(&result, "Profile updated successfully");
    match result {
        Ok(user) => {
            let refreshed = CurrentUser::from(&user);
            session
                .insert(session_keys::CURRENT_USER, &refreshed)
                .await?;
            Ok(ProfileTemplate {
                layout: Layout::new(&state, Some(refreshed), "Profile"),
                name: user.name,
                email: user.email,
                form: outcome,
            }
            .into_response())
        }
        Err(RepositoryError::Invalid(_) | RepositoryError::Conflict(_)) => {
            let template = ProfileTemplate {
                layout: Layout::new(&state, Some(current), "Profile"),
                name: form.name,
                email: form.email,
                form: outcome,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
