//! Declarative validation schemas for form and API input.
//!
//! Every schema is a plain struct deriving [`validator::Validate`]. Field
//! rules (length, e-mail, range, coercion, canonical price) and cross-field
//! refinements (password confirmation) are declared on the struct; running
//! them yields either the typed value or a [`ValidationFailure`] listing each
//! offending field path with a human-readable message.
//!
//! Insert and update variants are separate structs: server-assigned fields
//! (ids, rating aggregates, review counts, timestamps) never appear on insert
//! schemas.
//!
//! ```
//! use boutique_core::validation::{SignUpForm, Validated};
//!
//! let form = SignUpForm {
//!     name: "Al".to_owned(),
//!     email: "a@b.com".to_owned(),
//!     password: "abc123".to_owned(),
//!     confirm_password: "abc123".to_owned(),
//! };
//! let failure = form.validated().unwrap_err();
//! assert_eq!(failure.to_string(), "name: Name must be at least 3 characters");
//! ```

pub mod cart;
pub mod coerce;
pub mod order;
pub mod product;
pub mod user;

use core::fmt;
use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::types::money::canonical_amount;

pub use cart::CartItem;
pub use coerce::{Coercible, Coerced};
pub use order::{InsertOrder, InsertOrderItem, PaymentMethodForm, PaymentResult, ShippingAddress};
pub use product::{InsertProduct, InsertReview, UpdateProduct};
pub use user::{SignInForm, SignUpForm, UpdateProfileForm, UpdateUserForm};

/// Separator placed between field messages when a failure is rendered as a
/// single string.
pub const MESSAGE_SEPARATOR: &str = ". ";

/// Canonical stored price: digits, a period, exactly two digits.
static CANONICAL_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d{2}$").expect("canonical price pattern is valid"));

/// A single offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path, e.g. `confirm_password` or `shipping_address.city`.
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Structured validation failure: one entry per offending field rule,
/// ordered by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
}

impl ValidationFailure {
    /// A failure for a single field.
    #[must_use]
    pub fn field(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    /// Collect already-built field errors, sorted by path.
    #[must_use]
    pub fn from_errors(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        Self { errors }
    }

    /// Re-key errors under `parent.` as top-level paths, for forms that
    /// show a nested object's fields inline.
    #[must_use]
    pub fn unnest(self, parent: &str) -> Self {
        let prefix = format!("{parent}.");
        Self::from_errors(
            self.errors
                .into_iter()
                .map(|FieldError { path, message }| FieldError {
                    path: path
                        .strip_prefix(&prefix)
                        .map_or_else(|| path.clone(), str::to_owned),
                    message,
                })
                .collect(),
        )
    }

    /// All field errors, ordered by path.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any error is attached to `path`.
    #[must_use]
    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// First message attached to `path`.
    #[must_use]
    pub fn message_for(&self, path: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(MESSAGE_SEPARATOR)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut collected = Vec::new();
        flatten(None, &errors, &mut collected);
        collected.sort_by(|a, b| a.path.cmp(&b.path));
        Self { errors: collected }
    }
}

fn flatten(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| FieldError {
                    path: path.clone(),
                    message: describe(error),
                }));
            }
            ValidationErrorsKind::Struct(inner) => flatten(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(Some(&format!("{path}[{index}]")), inner, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map_or_else(|| format!("invalid value ({})", error.code), ToString::to_string)
}

/// Run a schema's rules, returning the value itself on success.
pub trait Validated: Validate + Sized {
    /// Validate `self`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] listing every offending field.
    fn validated(self) -> Result<Self, ValidationFailure> {
        self.validate()?;
        Ok(self)
    }
}

impl<T: Validate> Validated for T {}

/// Build a rule error with a fixed message.
pub(crate) fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Price rule: the canonical rendering must be `digits.dd`.
pub(crate) fn two_decimal_places(price: &Decimal) -> Result<(), ValidationError> {
    if CANONICAL_PRICE.is_match(&canonical_amount(*price)) {
        Ok(())
    } else {
        Err(rule_error(
            "price",
            "Price must be a positive amount with exactly two decimals (e.g. 49.99)",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_paths_and_messages() {
        let failure = ValidationFailure {
            errors: vec![
                FieldError {
                    path: "email".to_owned(),
                    message: "Invalid email address".to_owned(),
                },
                FieldError {
                    path: "name".to_owned(),
                    message: "Name must be at least 3 characters".to_owned(),
                },
            ],
        };
        assert_eq!(
            failure.to_string(),
            "email: Invalid email address. name: Name must be at least 3 characters"
        );
    }

    #[test]
    fn test_unnest_flattens_only_the_parent() {
        let failure = ValidationFailure::from_errors(vec![
            FieldError {
                path: "product.name".to_owned(),
                message: "Name must be at least 3 characters".to_owned(),
            },
            FieldError {
                path: "id".to_owned(),
                message: "Id is required".to_owned(),
            },
            FieldError {
                path: "production.city".to_owned(),
                message: "City must be at least 3 characters".to_owned(),
            },
        ])
        .unnest("product");

        assert_eq!(
            failure.message_for("name"),
            Some("Name must be at least 3 characters")
        );
        assert!(failure.has_path("id"));
        assert!(failure.has_path("production.city"));
        assert!(!failure.has_path("product.name"));
    }

    #[test]
    fn test_field_constructor() {
        let failure = ValidationFailure::field("email", "already taken");
        assert!(failure.has_path("email"));
        assert_eq!(failure.message_for("email"), Some("already taken"));
        assert_eq!(failure.message_for("name"), None);
    }

    #[test]
    fn test_two_decimal_places() {
        assert!(two_decimal_places(&Decimal::new(4999, 2)).is_ok());
        assert!(two_decimal_places(&Decimal::new(5, 0)).is_ok());
        assert!(two_decimal_places(&Decimal::new(-4999, 2)).is_err());
    }
}
