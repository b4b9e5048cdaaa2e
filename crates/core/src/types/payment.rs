//! Payment methods accepted at checkout.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Accepted payment method identifiers, in display order.
pub const PAYMENT_METHODS: &[&str] = &["PayPal", "Stripe", "CashOnDelivery"];

/// Payment method preselected on the checkout form.
pub const DEFAULT_PAYMENT_METHOD: PaymentMethod = PaymentMethod::PayPal;

/// A payment method the storefront accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    PayPal,
    Stripe,
    CashOnDelivery,
}

impl PaymentMethod {
    /// All accepted methods, matching [`PAYMENT_METHODS`].
    pub const ALL: [Self; 3] = [Self::PayPal, Self::Stripe, Self::CashOnDelivery];

    /// Identifier as stored and posted by forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PayPal => "PayPal",
            Self::Stripe => "Stripe",
            Self::CashOnDelivery => "CashOnDelivery",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PayPal => "PayPal",
            Self::Stripe => "Stripe",
            Self::CashOnDelivery => "Cash on delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for identifiers outside [`PAYMENT_METHODS`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid payment method: {0}")]
pub struct ParsePaymentMethodError(String);

impl FromStr for PaymentMethod {
    type Err = ParsePaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ParsePaymentMethodError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_identifiers() {
        let ids: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(ids, PAYMENT_METHODS);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(
            "CashOnDelivery".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert!("paypal".parse::<PaymentMethod>().is_err());
        assert!("Bitcoin".parse::<PaymentMethod>().is_err());
    }
}
