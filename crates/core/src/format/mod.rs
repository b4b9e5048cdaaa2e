//! Pure formatting helpers for rendering stored values.
//!
//! Nothing here touches I/O or mutates its input. Stored (canonical) values
//! are turned into locale-aware display strings, and a few helpers go the
//! other way for storage.

mod datetime;
mod number;
mod query;

pub use datetime::{FormattedDateTime, format_date_time};
pub use number::{
    Amount, CurrencyFormatter, DecimalMode, NOT_AVAILABLE, format_currency, format_id,
    format_number, format_number_with_decimal, round2,
};
pub use query::form_url_query;

/// Errors returned by formatting helpers that accept loosely typed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The value is neither a number nor a numeric string.
    #[error("value is neither a number nor a string (got {0})")]
    NotNumeric(&'static str),

    /// A string was supplied but does not parse as a finite number.
    #[error("value is not a valid number: {0:?}")]
    InvalidNumber(String),
}
