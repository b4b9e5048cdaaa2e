//! Numeric coercion for form input.
//!
//! HTML forms submit every value as text while JSON callers send numbers.
//! [`Coerced`] accepts either and records a value that cannot be read as a
//! number instead of failing deserialization, so the schema's rules report it
//! as an ordinary field error.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeric types that can be read from loosely typed input.
pub trait Coercible: Sized + Copy {
    /// Convert an integer.
    fn from_integer(value: i64) -> Option<Self>;
    /// Convert a float.
    fn from_float(value: f64) -> Option<Self>;
    /// Parse trimmed text.
    fn from_text(value: &str) -> Option<Self>;
}

macro_rules! impl_coercible_int {
    ($($t:ty),*) => {$(
        impl Coercible for $t {
            fn from_integer(value: i64) -> Option<Self> {
                Self::try_from(value).ok()
            }

            #[allow(clippy::cast_possible_truncation)]
            fn from_float(value: f64) -> Option<Self> {
                if value.is_finite() && value.fract() == 0.0 {
                    Self::try_from(value as i64).ok()
                } else {
                    None
                }
            }

            fn from_text(value: &str) -> Option<Self> {
                value
                    .parse::<Self>()
                    .ok()
                    .or_else(|| value.parse::<f64>().ok().and_then(Self::from_float))
            }
        }
    )*};
}

impl_coercible_int!(i32, i64);

impl Coercible for Decimal {
    fn from_integer(value: i64) -> Option<Self> {
        Some(Self::from(value))
    }

    fn from_float(value: f64) -> Option<Self> {
        Self::from_f64(value)
    }

    fn from_text(value: &str) -> Option<Self> {
        Self::from_str(value)
            .ok()
            .or_else(|| Self::from_scientific(value).ok())
    }
}

/// A number read from a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coerced<T> {
    /// The input was numeric.
    Value(T),
    /// The input could not be read as a number; holds the raw text.
    Invalid(String),
}

impl<T: Coercible> Coerced<T> {
    /// Coerce raw text (e.g. a form field).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Invalid(String::new());
        }
        T::from_text(trimmed).map_or_else(|| Self::Invalid(raw.to_owned()), Self::Value)
    }

    /// The coerced value, if the input was numeric.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Invalid(_) => None,
        }
    }
}

impl<T> From<T> for Coerced<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de, T: Coercible> Deserialize<'de> for Coerced<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => T::from_integer(n).map_or_else(|| Self::Invalid(n.to_string()), Self::Value),
            Raw::Float(n) => T::from_float(n).map_or_else(|| Self::Invalid(n.to_string()), Self::Value),
            Raw::Text(s) => Self::parse(&s),
            Raw::Other(v) => Self::Invalid(v.to_string()),
        })
    }
}

impl<T: Serialize> Serialize for Coerced<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}
