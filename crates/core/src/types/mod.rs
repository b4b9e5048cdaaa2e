//! Core types for Boutique.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod locale;
pub mod money;
pub mod payment;

pub use id::*;
pub use locale::{Locale, ParseLocaleError};
pub use money::{CurrencyCode, MONEY_SCALE, ParseCurrencyError, canonical_amount, to_money_scale};
pub use payment::{DEFAULT_PAYMENT_METHOD, PAYMENT_METHODS, PaymentMethod, ParsePaymentMethodError};
