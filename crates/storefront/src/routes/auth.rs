//! Sign-in, sign-up and sign-out route handlers.
//!
//! Both forms carry a hidden `callback_url` captured when the page was
//! entered. A failed submission re-renders the form with the error message;
//! a successful one stores the user in the session and follows the callback.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::validation::{SignInForm, SignUpForm, Validated};

use crate::db::CartRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::form::{CallbackQuery, FormState, sanitize_callback_url};
use crate::middleware::{OptionalAuth, clear_current_user, session_cart_id, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

use super::Layout;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form post.
#[derive(Debug, Deserialize)]
pub struct SignInSubmission {
    #[serde(flatten)]
    pub form: SignInForm,
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// Sign-up form post.
#[derive(Debug, Deserialize)]
pub struct SignUpSubmission {
    #[serde(flatten)]
    pub form: SignUpForm,
    #[serde(default)]
    pub callback_url: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {
    pub layout: Layout,
    pub callback_url: String,
    pub email: String,
    pub form: FormState,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_up.html")]
pub struct SignUpTemplate {
    pub layout: Layout,
    pub callback_url: String,
    pub name: String,
    pub email: String,
    pub form: FormState,
}

/// Status to re-render a failed submission with, or `None` to propagate.
fn rerender_status(err: &AppError) -> Option<StatusCode> {
    match err {
        AppError::Validation(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
        AppError::Auth(AuthError::InvalidCredentials) => Some(StatusCode::UNAUTHORIZED),
        AppError::Auth(AuthError::UserAlreadyExists) => Some(StatusCode::CONFLICT),
        _ => None,
    }
}

/// Put the user in the session and hand them their anonymous cart.
async fn start_session(state: &AppState, session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    if let Some(cart_id) = session_cart_id(session).await? {
        CartRepository::new(state.pool())
            .claim(&cart_id, user.id)
            .await?;
    }
    set_sentry_user(&user.id, Some(&user.email));
    Ok(())
}

// =============================================================================
// Sign In
// =============================================================================

/// Display the sign-in page, or skip it when already signed in.
pub async fn sign_in_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(&query.target()).into_response();
    }

    SignInTemplate {
        layout: Layout::new(&state, None, "Sign in"),
        callback_url: query.target(),
        email: String::new(),
        form: FormState::Idle,
    }
    .into_response()
}

/// Handle sign-in form submission.
#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(submission): Form<SignInSubmission>,
) -> Result<Response> {
    let callback_url = sanitize_callback_url(submission.callback_url.as_deref());

    let outcome: Result<User> = async {
        let form = submission.form.clone().validated()?;
        let user = AuthService::new(state.pool()).sign_in(&form).await?;
        start_session(&state, &session, &user).await?;
        Ok(user)
    }
    .await;

    let form = FormState::resolve(&outcome, "Signed in");
    match outcome {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User signed in");
            Ok(Redirect::to(&callback_url).into_response())
        }
        Err(err) => {
            let Some(status) = rerender_status(&err) else {
                return Err(err);
            };
            tracing::debug!(error = %err, "Sign-in rejected");
            let template = SignInTemplate {
                layout: Layout::new(&state, None, "Sign in"),
                callback_url,
                email: submission.form.email,
                form,
            };
            Ok((status, template).into_response())
        }
    }
}

// =============================================================================
// Sign Up
// =============================================================================

/// Display the sign-up page, or skip it when already signed in.
pub async fn sign_up_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(&query.target()).into_response();
    }

    SignUpTemplate {
        layout: Layout::new(&state, None, "Sign up"),
        callback_url: query.target(),
        name: String::new(),
        email: String::new(),
        form: FormState::Idle,
    }
    .into_response()
}

/// Handle sign-up form submission.
#[instrument(skip_all)]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(submission): Form<SignUpSubmission>,
) -> Result<Response> {
    let callback_url = sanitize_callback_url(submission.callback_url.as_deref());

    let outcome: Result<User> = async {
        let form = submission.form.clone().validated()?;
        let user = AuthService::new(state.pool()).sign_up(&form).await?;
        start_session(&state, &session, &user).await?;
        Ok(user)
    }
    .await;

    let form = FormState::resolve(&outcome, "Account created");
    match outcome {
        Ok(_) => Ok(Redirect::to(&callback_url).into_response()),
        Err(err) => {
            let Some(status) = rerender_status(&err) else {
                return Err(err);
            };
            tracing::debug!(error = %err, "Sign-up rejected");
            let template = SignUpTemplate {
                layout: Layout::new(&state, None, "Sign up"),
                callback_url,
                name: submission.form.name,
                email: submission.form.email,
                form,
            };
            Ok((status, template).into_response())
        }
    }
}

// =============================================================================
// Sign Out
// =============================================================================

/// Clear the session and return home.
pub async fn sign_out(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use boutique_core::ValidationFailure;

    use super::*;

    #[test]
    fn test_rerender_status() {
        let validation = AppError::Validation(ValidationFailure::field("name", "too short"));
        assert_eq!(
            rerender_status(&validation),
            Some(StatusCode::UNPROCESSABLE_ENTITY)
        );
        assert_eq!(
            rerender_status(&AppError::Auth(AuthError::UserAlreadyExists)),
            Some(StatusCode::CONFLICT)
        );
        assert_eq!(
            rerender_status(&AppError::Internal("boom".to_string())),
            None
        );
    }
}
