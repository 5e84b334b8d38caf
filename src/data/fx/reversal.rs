//! Rate reversal with a fixed precision contract
//!
//! Inverted factors are rounded to 16 significant digits, half-up
//! (IEEE 754 decimal64 precision). Downstream consumers compare against
//! values produced under this exact rule.

use super::base::ResolvedRate;
use crate::error::{RatesError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Significant digits kept by an inversion
pub const DECIMAL64_DIGITS: u32 = 16;

/// `1 / factor`, rounded to [`DECIMAL64_DIGITS`] significant digits
pub fn invert_factor(factor: Decimal) -> Result<Decimal> {
    if factor.is_zero() {
        return Err(RatesError::Precondition(
            "Cannot invert a zero rate factor".to_string(),
        ));
    }

    let exact = Decimal::ONE
        .checked_div(factor)
        .ok_or_else(|| RatesError::Overflow(format!("1 / {}", factor)))?;

    // Rates are positive, so away-from-zero on a midpoint is half-up
    exact
        .round_sf_with_strategy(DECIMAL64_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .ok_or_else(|| RatesError::Overflow(format!("rounding 1 / {}", factor)))
}

/// Reverse a rate: swap base and term, invert the factor, keep the context
pub fn reverse(rate: Option<&ResolvedRate>) -> Result<ResolvedRate> {
    let rate = rate.ok_or_else(|| {
        RatesError::Precondition("Rate null is not reversible".to_string())
    })?;

    Ok(ResolvedRate::new(
        rate.term,
        rate.base,
        invert_factor(rate.factor)?,
        rate.context.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayKey;
    use crate::currency::CurrencyCode;
    use crate::data::fx::base::{ProviderContext, RateType};
    use rust_decimal_macros::dec;

    fn eur_usd(factor: Decimal) -> ResolvedRate {
        let ctx = ProviderContext::new("ECB", vec![RateType::Historic])
            .historic(DayKey::from_millis(0));
        ResolvedRate::new(CurrencyCode::EUR, CurrencyCode::USD, factor, ctx)
    }

    #[test]
    fn test_invert_sixteen_digits() {
        assert_eq!(invert_factor(dec!(1.10)).unwrap(), dec!(0.9090909090909091));
        assert_eq!(invert_factor(dec!(3)).unwrap(), dec!(0.3333333333333333));
        assert_eq!(invert_factor(dec!(130.0)).unwrap(), dec!(0.007692307692307692));
    }

    #[test]
    fn test_invert_rounds_half_up() {
        // 1/1.5 = 0.6666...; 16th digit rounds up
        assert_eq!(invert_factor(dec!(1.5)).unwrap(), dec!(0.6666666666666667));
        // 1/7 = 0.142857142857142857...; 17th digit is 8
        assert_eq!(invert_factor(dec!(7)).unwrap(), dec!(0.1428571428571429));
    }

    #[test]
    fn test_invert_exact() {
        assert_eq!(invert_factor(dec!(1.25)).unwrap(), dec!(0.8));
        assert_eq!(invert_factor(dec!(0.5)).unwrap(), dec!(2));
    }

    #[test]
    fn test_invert_zero() {
        assert!(matches!(
            invert_factor(Decimal::ZERO),
            Err(RatesError::Precondition(_))
        ));
    }

    #[test]
    fn test_reverse_swaps_pair() {
        let rate = eur_usd(dec!(1.10));
        let reversed = reverse(Some(&rate)).unwrap();

        assert_eq!(reversed.base, CurrencyCode::USD);
        assert_eq!(reversed.term, CurrencyCode::EUR);
        assert_eq!(reversed.factor, dec!(0.9090909090909091));
        assert_eq!(reversed.context, rate.context);
        assert!(reversed.chain.is_empty());
    }

    #[test]
    fn test_reverse_missing_rate() {
        assert!(matches!(reverse(None), Err(RatesError::Precondition(_))));
    }
}
