//! Currency, rounding and decimal formatting.

use rust_decimal::prelude::*;
use serde_json::Value;

use super::FormatError;
use crate::types::money::to_money_scale;
use crate::types::{CurrencyCode, Locale};

/// Sentinel rendered for missing or non-numeric amounts.
pub const NOT_AVAILABLE: &str = "N/A";

/// Maximum fraction digits shown by [`format_number`].
const NUMBER_MAX_FRACTION_DIGITS: u32 = 3;

/// A value that may be rendered as an amount of money.
///
/// Implemented for decimals, floats, integers and numeric strings. Missing
/// (`None`) or non-numeric values yield `None`.
pub trait Amount {
    /// Convert to an exact decimal, if the value is numeric.
    fn to_decimal(&self) -> Option<Decimal>;
}

impl Amount for Decimal {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl Amount for f64 {
    fn to_decimal(&self) -> Option<Decimal> {
        if self.is_finite() {
            Decimal::from_f64(*self)
        } else {
            None
        }
    }
}

impl Amount for str {
    fn to_decimal(&self) -> Option<Decimal> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
    }
}

impl Amount for String {
    fn to_decimal(&self) -> Option<Decimal> {
        self.as_str().to_decimal()
    }
}

impl<T: Amount + ?Sized> Amount for &T {
    fn to_decimal(&self) -> Option<Decimal> {
        (**self).to_decimal()
    }
}

impl<T: Amount> Amount for Option<T> {
    fn to_decimal(&self) -> Option<Decimal> {
        self.as_ref().and_then(Amount::to_decimal)
    }
}

macro_rules! integer_amount {
    ($($ty:ty),*) => {
        $(
            impl Amount for $ty {
                fn to_decimal(&self) -> Option<Decimal> {
                    Some(Decimal::from(*self))
                }
            }
        )*
    };
}

integer_amount!(i32, i64, u32, u64);

/// Locale-aware currency formatter.
///
/// Always renders exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrencyFormatter {
    locale: Locale,
    currency: CurrencyCode,
}

impl CurrencyFormatter {
    /// Create a formatter for a locale and currency.
    #[must_use]
    pub const fn new(locale: Locale, currency: CurrencyCode) -> Self {
        Self { locale, currency }
    }

    /// The formatter's locale.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Format an amount, or return [`NOT_AVAILABLE`] for missing or
    /// non-numeric input.
    #[must_use]
    pub fn format(&self, amount: impl Amount) -> String {
        let Some(value) = amount.to_decimal() else {
            return NOT_AVAILABLE.to_owned();
        };

        let value = to_money_scale(value);
        let sign = if value.is_sign_negative() && !value.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = localize_digits(&value.abs().to_string(), self.locale);
        let symbol = self.currency.symbol();

        if self.locale.currency_after_amount() {
            format!("{sign}{digits}\u{a0}{symbol}")
        } else {
            format!("{sign}{symbol}{digits}")
        }
    }
}

/// Format an amount with the default formatter (`fr-FR`, EUR).
///
/// ```
/// use boutique_core::format::format_currency;
///
/// assert_eq!(format_currency(None::<f64>), "N/A");
/// assert_eq!(format_currency(49.9), "49,90\u{a0}€");
/// ```
#[must_use]
pub fn format_currency(amount: impl Amount) -> String {
    CurrencyFormatter::default().format(amount)
}

/// Format a plain number with locale grouping (at most three fraction digits).
#[must_use]
pub fn format_number(number: Decimal, locale: Locale) -> String {
    let rounded = number
        .round_dp_with_strategy(NUMBER_MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}", localize_digits(&rounded.abs().to_string(), locale))
}

/// Output mode for [`format_number_with_decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalMode {
    /// Period separator; used for validation and storage.
    Canonical,
    /// Locale decimal separator; used for display only.
    Display(Locale),
}

/// Render a number with exactly two fractional digits.
///
/// Rounding works on the exact binary value of `number`, with exact ties
/// going away from zero (`0.125` renders as `0.13`). The underlying value is
/// never changed; only its rendering differs between modes.
#[must_use]
pub fn format_number_with_decimal(number: f64, mode: DecimalMode) -> String {
    // Non-finite and out-of-range floats have no decimal form.
    let canonical = Decimal::from_f64_retain(number)
        .map_or_else(|| format!("{number:.2}"), |d| to_money_scale(d).to_string());
    match mode {
        DecimalMode::Canonical => canonical,
        DecimalMode::Display(locale) => {
            canonical.replace('.', &locale.decimal_separator().to_string())
        }
    }
}

/// Round to two decimals with an epsilon correction for binary floating
/// point representation error.
///
/// Accepts JSON numbers and numeric strings; every other value type is an
/// error.
///
/// # Errors
///
/// Returns [`FormatError::NotNumeric`] for booleans, null, arrays and objects,
/// and [`FormatError::InvalidNumber`] for strings that are not finite numbers.
pub fn round2(value: impl Into<Value>) -> Result<f64, FormatError> {
    let number = match value.into() {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FormatError::InvalidNumber(n.to_string()))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(FormatError::InvalidNumber(s))?,
        Value::Null => return Err(FormatError::NotNumeric("null")),
        Value::Bool(_) => return Err(FormatError::NotNumeric("boolean")),
        Value::Array(_) => return Err(FormatError::NotNumeric("array")),
        Value::Object(_) => return Err(FormatError::NotNumeric("object")),
    };

    Ok(round_half_up((number + f64::EPSILON) * 100.0) / 100.0)
}

/// Render a long identifier as `..` followed by its trailing 6 characters.
#[must_use]
pub fn format_id(id: &str) -> String {
    let count = id.chars().count();
    let tail: String = id.chars().skip(count.saturating_sub(6)).collect();
    format!("..{tail}")
}

/// Round to the nearest integer, ties toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    let rounded = value.round();
    if value < 0.0 && (value - value.trunc()).abs() == 0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}

/// Apply locale grouping and decimal separators to a plain `1234.5` string.
fn localize_digits(plain: &str, locale: Locale) -> String {
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain, ""));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(locale.group_separator());
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}{}{fraction}", locale.decimal_separator())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const US_DOLLARS: CurrencyFormatter = CurrencyFormatter::new(Locale::EnUs, CurrencyCode::USD);

    #[test]
    fn test_format_currency_missing_is_not_available() {
        assert_eq!(format_currency(None::<f64>), NOT_AVAILABLE);
        assert_eq!(format_currency(None::<Decimal>), "N/A");
        assert_eq!(format_currency("not a number"), "N/A");
        assert_eq!(format_currency(""), "N/A");
        assert_eq!(format_currency(f64::NAN), "N/A");
    }

    #[test]
    fn test_format_currency_two_fraction_digits() {
        assert_eq!(format_currency(49.9), "49,90\u{a0}€");
        assert_eq!(US_DOLLARS.format(49.9), "$49.90");
        assert_eq!(US_DOLLARS.format(5), "$5.00");
    }

    #[test]
    fn test_format_currency_from_string() {
        assert_eq!(format_currency("1234.5"), "1\u{202f}234,50\u{a0}€");
        assert_eq!(US_DOLLARS.format("1234567.891"), "$1,234,567.89");
        assert_eq!(US_DOLLARS.format(Some("12")), "$12.00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(US_DOLLARS.format(-3.5), "-$3.50");
        assert_eq!(format_currency(-1234.5), "-1\u{202f}234,50\u{a0}€");
    }

    #[test]
    fn test_format_number_groups_digits() {
        assert_eq!(format_number(Decimal::new(12_345_678, 4), Locale::EnUs), "1,234.568");
        assert_eq!(format_number(Decimal::new(1_000_000, 0), Locale::FrFr), "1\u{202f}000\u{202f}000");
        assert_eq!(format_number(Decimal::new(25, 1), Locale::FrFr), "2,5");
    }

    #[test]
    fn test_round2_number_and_string_agree() {
        assert_eq!(round2(10.005).unwrap(), round2("10.005").unwrap());
        assert_eq!(round2(2.675).unwrap(), round2("2.675").unwrap());
    }

    #[test]
    fn test_round2_epsilon_correction() {
        assert!((round2(1.005).unwrap() - 1.01).abs() < f64::EPSILON);
        assert!((round2(" 3.14159 ").unwrap() - 3.14).abs() < f64::EPSILON);
        assert!((round2(7).unwrap() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round2_rejects_other_types() {
        assert_eq!(round2(true), Err(FormatError::NotNumeric("boolean")));
        assert_eq!(round2(Value::Null), Err(FormatError::NotNumeric("null")));
        assert!(matches!(round2("abc"), Err(FormatError::InvalidNumber(_))));
    }

    #[test]
    fn test_round_half_up_ties() {
        assert!((round_half_up(2.5) - 3.0).abs() < f64::EPSILON);
        assert!((round_half_up(-2.5) - -2.0).abs() < f64::EPSILON);
        assert!((round_half_up(-2.6) - -3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_number_with_decimal_ties_round_away_from_zero() {
        assert_eq!(format_number_with_decimal(0.125, DecimalMode::Canonical), "0.13");
        assert_eq!(format_number_with_decimal(1.125, DecimalMode::Canonical), "1.13");
        assert_eq!(format_number_with_decimal(-0.125, DecimalMode::Canonical), "-0.13");
        // 1.005 is stored just below the tie.
        assert_eq!(format_number_with_decimal(1.005, DecimalMode::Canonical), "1.00");
        assert_eq!(format_number_with_decimal(5.0, DecimalMode::Canonical), "5.00");
    }

    #[test]
    fn test_format_number_with_decimal_modes() {
        assert_eq!(format_number_with_decimal(49.9, DecimalMode::Canonical), "49.90");
        assert_eq!(
            format_number_with_decimal(49.9, DecimalMode::Display(Locale::FrFr)),
            "49,90"
        );
        assert_eq!(
            format_number_with_decimal(49.9, DecimalMode::Display(Locale::EnUs)),
            "49.90"
        );
    }

    #[test]
    fn test_format_id() {
        assert_eq!(format_id("3f2b8c1e-4c4b-4d0e-9a43-1c2d3e4f5a6b"), "..4f5a6b");
        assert_eq!(format_id("abc"), "..abc");
    }
}
