// --- File: crates/bora_traducoes/src/logic.rs ---
//! Markup arithmetic for translation quotes.

use crate::error::TraducoesError;

pub const MIN_MARKUP_PERCENT: i64 = 0;
pub const MAX_MARKUP_PERCENT: i64 = 100;

pub fn validate_markup(markup_percent: i64) -> Result<(), TraducoesError> {
    if (MIN_MARKUP_PERCENT..=MAX_MARKUP_PERCENT).contains(&markup_percent) {
        Ok(())
    } else {
        Err(TraducoesError::MarkupOutOfBounds(markup_percent))
    }
}

/// Applies the platform markup to a base price. Rounds down.
pub fn total_with_markup(
    valor_base_cents: i64,
    markup_percent: i64,
) -> Result<i64, TraducoesError> {
    validate_markup(markup_percent)?;
    if valor_base_cents <= 0 {
        return Err(TraducoesError::ValidationError(
            "valor_base_cents must be positive".to_string(),
        ));
    }

    valor_base_cents
        .checked_mul(100 + markup_percent)
        .map(|v| v / 100)
        .ok_or(TraducoesError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn markup_applied_and_rounded_down() {
        assert_eq!(total_with_markup(10_000, 20).unwrap(), 12_000);
        assert_eq!(total_with_markup(101, 20).unwrap(), 121); // 121.2 rounds down
        assert_eq!(total_with_markup(99, 0).unwrap(), 99);
        assert_eq!(total_with_markup(50, 100).unwrap(), 100);
    }

    #[test]
    fn markup_bounds_are_inclusive() {
        assert!(validate_markup(0).is_ok());
        assert!(validate_markup(100).is_ok());
        assert!(matches!(
            validate_markup(-1),
            Err(TraducoesError::MarkupOutOfBounds(-1))
        ));
        assert!(matches!(
            validate_markup(101),
            Err(TraducoesError::MarkupOutOfBounds(101))
        ));
    }

    #[test]
    fn base_amount_must_be_positive() {
        assert!(total_with_markup(0, 20).is_err());
        assert!(total_with_markup(-500, 20).is_err());
    }

    #[test]
    fn overflow_is_an_error_not_a_panic() {
        assert!(matches!(
            total_with_markup(i64::MAX, 1),
            Err(TraducoesError::AmountOverflow)
        ));
    }

    proptest! {
        #[test]
        fn total_never_below_base(base in 1i64..=10_000_000_000, markup in 0i64..=100) {
            let total = total_with_markup(base, markup).unwrap();
            prop_assert!(total >= base);
            prop_assert!(total <= base * 2);
        }

        #[test]
        fn zero_markup_is_identity(base in 1i64..=10_000_000_000) {
            prop_assert_eq!(total_with_markup(base, 0).unwrap(), base);
        }
    }
}
