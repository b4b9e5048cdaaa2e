//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use boutique_core::ValidationFailure;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Submitted input failed its schema.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) | RepositoryError::OutOfStock(_) => {
                    StatusCode::CONFLICT
                }
                RepositoryError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            // Don't expose internal error details to clients
            return (status, "Internal server error").into_response();
        }

        tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        (status, format_error(&self)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Normalize any error to a user-facing message.
///
/// Validation failures become their joined `path: message` list, database
/// constraint violations their database message, and everything else its
/// `Display` text (or its `Debug` form when that text is empty).
#[must_use]
pub fn format_error(err: &(dyn StdError + 'static)) -> String {
    if let Some(app) = err.downcast_ref::<AppError>() {
        return match app {
            AppError::Validation(failure) => failure.to_string(),
            AppError::Database(inner) => format_error(inner),
            AppError::Auth(inner) => format_error(inner),
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            other => display_or_debug(other),
        };
    }

    if let Some(failure) = err.downcast_ref::<ValidationFailure>() {
        return failure.to_string();
    }

    if let Some(repo) = err.downcast_ref::<RepositoryError>() {
        return match repo {
            RepositoryError::Invalid(failure) => failure.to_string(),
            RepositoryError::Database(sqlx::Error::Database(db_err))
                if db_err.constraint().is_some() =>
            {
                db_err.message().to_owned()
            }
            RepositoryError::Conflict(msg) => capitalize(msg),
            other => display_or_debug(other),
        };
    }

    if let Some(auth) = err.downcast_ref::<AuthError>() {
        return match auth {
            AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
            AuthError::UserAlreadyExists => "An account with this email already exists".to_owned(),
            AuthError::Repository(inner) => format_error(inner),
            AuthError::PasswordHash => display_or_debug(auth),
        };
    }

    display_or_debug(err)
}

fn display_or_debug(err: &dyn StdError) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        format!("{err:?}")
    } else {
        text
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationFailure::field("name", "too short"))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::OutOfStock("Shirt".to_string()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_error_validation_failure() {
        let failure = ValidationFailure::field("name", "Name must be at least 3 characters");
        assert_eq!(
            format_error(&failure),
            "name: Name must be at least 3 characters"
        );
        assert_eq!(
            format_error(&AppError::from(failure)),
            "name: Name must be at least 3 characters"
        );
    }

    #[test]
    fn test_format_error_auth_and_conflict() {
        assert_eq!(
            format_error(&AppError::Auth(AuthError::UserAlreadyExists)),
            "An account with this email already exists"
        );
        assert_eq!(
            format_error(&RepositoryError::Conflict("order is already paid".to_string())),
            "Order is already paid"
        );
    }

    #[derive(Debug)]
    struct Silent;

    impl fmt::Display for Silent {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }
    }

    impl StdError for Silent {}

    #[test]
    fn test_format_error_falls_back_to_debug() {
        assert_eq!(format_error(&Silent), "Silent");
        assert_eq!(format_error(&AppError::NotFound("Order".into())), "Order");
    }
}
