//! Property tests for formatting and validation rules.

#![allow(clippy::unwrap_used)]

use boutique_core::format::{DecimalMode, format_number_with_decimal, round2};
use boutique_core::validation::{Coerced, InsertReview, Validated};
use boutique_core::{ProductId, UserId, canonical_amount};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn review(rating: i32) -> InsertReview {
    InsertReview {
        user_id: UserId::generate(),
        product_id: ProductId::generate(),
        rating: Coerced::Value(rating),
        title: "Nice fit".to_owned(),
        description: "Would buy again".to_owned(),
        is_verified_purchase: true,
    }
}

proptest! {
    #[test]
    fn canonical_amount_always_has_two_decimals(cents in -10_000_000i64..10_000_000, extra in 0u32..4) {
        let amount = Decimal::new(cents * 10i64.pow(extra), 2 + extra);
        let rendered = canonical_amount(amount);
        let (_, fraction) = rendered.rsplit_once('.').unwrap();
        prop_assert_eq!(fraction.len(), 2);
    }

    #[test]
    fn canonical_decimal_mode_is_idempotent(value in -1_000_000.0f64..1_000_000.0) {
        let once = format_number_with_decimal(value, DecimalMode::Canonical);
        let parsed: f64 = once.parse().unwrap();
        let twice = format_number_with_decimal(parsed, DecimalMode::Canonical);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn round2_agrees_for_numbers_and_strings(cents in 0i64..10_000_000) {
        let value = Decimal::new(cents, 3);
        let text = value.to_string();
        let number: f64 = text.parse().unwrap();
        prop_assert_eq!(round2(number).unwrap(), round2(text.as_str()).unwrap());
    }

    #[test]
    fn rating_accepted_only_between_one_and_five(rating in -20i32..20) {
        let accepted = review(rating).validated().is_ok();
        prop_assert_eq!(accepted, (1..=5).contains(&rating));
    }
}
