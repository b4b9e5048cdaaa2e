//! Display locales supported by the storefront.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A display locale.
///
/// Controls decimal/grouping separators, currency symbol placement and the
/// calendar names used for dates. Stored values are never affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    /// French (France): `1 234,50 €`, `lun. 15 janv. 2024`.
    #[default]
    #[serde(rename = "fr-FR")]
    FrFr,
    /// English (United States): `$1,234.50`, `Mon, Jan 15, 2024`.
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    /// BCP 47 language tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::FrFr => "fr-FR",
            Self::EnUs => "en-US",
        }
    }

    /// Decimal separator used for display.
    #[must_use]
    pub const fn decimal_separator(self) -> char {
        match self {
            Self::FrFr => ',',
            Self::EnUs => '.',
        }
    }

    /// Digit grouping separator used for display.
    #[must_use]
    pub const fn group_separator(self) -> char {
        match self {
            // Narrow no-break space
            Self::FrFr => '\u{202f}',
            Self::EnUs => ',',
        }
    }

    /// Whether the currency symbol follows the amount.
    #[must_use]
    pub const fn currency_after_amount(self) -> bool {
        matches!(self, Self::FrFr)
    }

    /// Calendar locale for chrono's localized formatting.
    #[must_use]
    pub const fn calendar(self) -> chrono::Locale {
        match self {
            Self::FrFr => chrono::Locale::fr_FR,
            Self::EnUs => chrono::Locale::en_US,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unsupported locale tag.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct ParseLocaleError(String);

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" => Ok(Self::FrFr),
            "en" | "en-us" => Ok(Self::EnUs),
            _ => Err(ParseLocaleError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("fr-FR".parse::<Locale>().unwrap(), Locale::FrFr);
        assert_eq!("fr_FR".parse::<Locale>().unwrap(), Locale::FrFr);
        assert_eq!("en-us".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("de-DE".parse::<Locale>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for locale in [Locale::FrFr, Locale::EnUs] {
            assert_eq!(locale.to_string().parse::<Locale>().unwrap(), locale);
        }
    }
}
