//! Form submission state shared by the auth and account pages.

use serde::Deserialize;

use crate::error::format_error;

/// Where to land when no (or an unsafe) callback URL was given.
pub const DEFAULT_CALLBACK: &str = "/";

/// Outcome of the most recent submission of a form.
///
/// A form starts `Idle`. Each submission moves it to `Success` or `Failure`;
/// resubmitting after a failure simply submits again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Success { message: String },
    Failure { message: String },
}

impl FormState {
    /// Resolve a submission into the next state.
    ///
    /// Failures carry the error as rendered by [`format_error`].
    pub fn resolve<T, E>(result: &Result<T, E>, success_message: impl Into<String>) -> Self
    where
        E: std::error::Error + 'static,
    {
        match result {
            Ok(_) => Self::Success {
                message: success_message.into(),
            },
            Err(err) => Self::Failure {
                message: format_error(err),
            },
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    /// Whether the last submission succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Message to show next to the form, empty when idle.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Success { message } | Self::Failure { message } => message,
        }
    }
}

/// `?callback_url=` captured when a form page is entered.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(alias = "callbackUrl")]
    pub callback_url: Option<String>,
}

impl CallbackQuery {
    #[must_use]
    pub fn target(&self) -> String {
        sanitize_callback_url(self.callback_url.as_deref())
    }
}

/// Restrict a callback URL to a local path.
///
/// Absolute and protocol-relative URLs (`//host`) fall back to `/`.
#[must_use]
pub fn sanitize_callback_url(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => {
            url.to_owned()
        }
        _ => DEFAULT_CALLBACK.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use boutique_core::ValidationFailure;

    use super::*;
    use crate::services::auth::AuthError;

    #[test]
    fn test_idle_has_no_message() {
        let state = FormState::default();
        assert_eq!(state, FormState::Idle);
        assert_eq!(state.message(), "");
        assert!(!state.is_success());
        assert!(!state.is_failure());
    }

    #[test]
    fn test_resolve_success_and_failure() {
        let ok: Result<(), ValidationFailure> = Ok(());
        assert_eq!(
            FormState::resolve(&ok, "Signed in"),
            FormState::success("Signed in")
        );

        let err: Result<(), ValidationFailure> = Err(ValidationFailure::field(
            "name",
            "Name must be at least 3 characters",
        ));
        let state = FormState::resolve(&err, "Signed in");
        assert!(state.is_failure());
        assert_eq!(state.message(), "name: Name must be at least 3 characters");
    }

    #[test]
    fn test_failure_can_resubmit() {
        let first: Result<(), AuthError> = Err(AuthError::InvalidCredentials);
        let first = FormState::resolve(&first, "Welcome back");
        assert_eq!(first.message(), "Invalid email or password");

        let retry: Result<(), AuthError> = Ok(());
        let second = FormState::resolve(&retry, "Welcome back");
        assert!(second.is_success());
        assert_eq!(second.message(), "Welcome back");
    }

    #[test]
    fn test_sanitize_callback_url() {
        assert_eq!(sanitize_callback_url(None), "/");
        assert_eq!(sanitize_callback_url(Some("/cart")), "/cart");
        assert_eq!(
            sanitize_callback_url(Some("/checkout/shipping")),
            "/checkout/shipping"
        );
        assert_eq!(sanitize_callback_url(Some("https://evil.example")), "/");
        assert_eq!(sanitize_callback_url(Some("//evil.example")), "/");
        assert_eq!(sanitize_callback_url(Some("/\\evil.example")), "/");
        assert_eq!(sanitize_callback_url(Some("")), "/");
    }

    #[test]
    fn test_callback_query_accepts_camel_case() {
        let query: CallbackQuery =
            serde_json::from_str(r#"{"callbackUrl":"/account/orders"}"#).unwrap_or_default();
        assert_eq!(query.target(), "/account/orders");
    }
}
