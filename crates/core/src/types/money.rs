//! Currency codes and canonical (storage) rendering of monetary amounts.
//!
//! Monetary values are stored as `NUMERIC(12,2)` and always rendered with
//! exactly two fractional digits and a period separator in canonical form.
//! Locale-specific rendering lives in [`crate::format`].

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of fractional digits every stored amount carries.
pub const MONEY_SCALE: u32 = 2;

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    USD,
    #[default]
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol (e.g. `€`).
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code (e.g. `EUR`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown currency code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported currency code: {0}")]
pub struct ParseCurrencyError(String);

impl FromStr for CurrencyCode {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(ParseCurrencyError(s.to_owned())),
        }
    }
}

/// Round an amount to the stored scale (half away from zero).
#[must_use]
pub fn to_money_scale(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Canonical storage form: exactly two fractional digits, period separator.
///
/// ```
/// use rust_decimal::Decimal;
/// use boutique_core::types::money::canonical_amount;
///
/// assert_eq!(canonical_amount(Decimal::new(499, 1)), "49.90");
/// ```
#[must_use]
pub fn canonical_amount(amount: Decimal) -> String {
    to_money_scale(amount).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_symbols() {
        assert_eq!(CurrencyCode::EUR.symbol(), "€");
        assert_eq!(CurrencyCode::USD.symbol(), "$");
        assert_eq!(CurrencyCode::GBP.symbol(), "£");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_canonical_amount_pads_and_rounds() {
        assert_eq!(canonical_amount(Decimal::new(5, 0)), "5.00");
        assert_eq!(canonical_amount(Decimal::new(49_999, 3)), "50.00");
        assert_eq!(canonical_amount(Decimal::new(10_005, 3)), "10.01");
    }
}
