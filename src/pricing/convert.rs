//! Conversion of local prices into the reference currency.

use crate::rates::ExchangeRateTable;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Converts a local price into the reference currency of `rates`.
///
/// The table stores local units per reference unit, so the reference
/// value is `local_price / rate`, rounded half-up to 2 decimal places.
/// Returns `None` when the currency has no usable rate.
pub fn to_reference(
    local_price: f64,
    local_currency: &str,
    rates: &ExchangeRateTable,
) -> Option<f64> {
    let rate = rates.rate(local_currency)?;
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }

    let value = local_price / rate;
    if !value.is_finite() {
        return None;
    }

    Some(round_half_up(value, 2))
}

/// Rounds half away from zero on the shortest decimal form of `value`.
///
/// `1.005` rounds to `1.01` even though its binary value is slightly
/// below the midpoint.
pub fn round_half_up(value: f64, places: u32) -> f64 {
    Decimal::from_str(&value.to_string())
        .ok()
        .and_then(|d| {
            d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero).to_f64()
        })
        .unwrap_or_else(|| {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_currency() {
        let rates = ExchangeRateTable::default();
        assert_eq!(to_reference(100.0, "XXX", &rates), None);
    }

    #[test]
    fn test_basic_conversion() {
        let rates = ExchangeRateTable::new("CNY", [("USD", 7.0)]);
        assert_eq!(to_reference(100.0, "USD", &rates), Some(14.29));
    }

    #[test]
    fn test_conversion_below_one() {
        let rates = ExchangeRateTable::new("USD", [("USD", 1.0), ("EUR", 0.9)]);
        assert_eq!(to_reference(9.99, "USD", &rates), Some(9.99));
        assert_eq!(to_reference(8.99, "EUR", &rates), Some(9.99));
    }

    #[test]
    fn test_unusable_rates() {
        let rates = ExchangeRateTable::new("CNY", [("ZER", 0.0), ("NEG", -2.0), ("NAN", f64::NAN)]);
        assert_eq!(to_reference(10.0, "ZER", &rates), None);
        assert_eq!(to_reference(10.0, "NEG", &rates), None);
        assert_eq!(to_reference(10.0, "NAN", &rates), None);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(1.005, 2), 1.01);
        assert_eq!(round_half_up(2.675, 2), 2.68);
        assert_eq!(round_half_up(1.004, 2), 1.0);
        assert_eq!(round_half_up(14.285714285714286, 2), 14.29);
        assert_eq!(round_half_up(0.0, 2), 0.0);
        assert_eq!(round_half_up(980.0, 2), 980.0);
    }
}
