//! Integer amounts and the sale exchange rate
//!
//! Every amount is an unsigned integer in the asset's smallest unit. The
//! contracts never assume decimals or total supply, so no fixed-point type is
//! involved: quoting is a single checked multiplication.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU128;

use crate::errors::NumericError;

/// Amount in the smallest unit of an asset or of the payment currency
pub type Amount = u128;

/// Units of asset granted per unit of payment currency.
///
/// Invariant: never zero. Construction from a raw `u128` (including
/// deserialization) rejects zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u128", into = "u128")]
pub struct ExchangeRate(NonZeroU128);

impl ExchangeRate {
    /// Create a rate, returning `None` for zero
    pub fn new(units_per_payment: u128) -> Option<Self> {
        NonZeroU128::new(units_per_payment).map(Self)
    }

    /// Raw units-per-payment value
    pub fn get(&self) -> u128 {
        self.0.get()
    }

    /// Asset units owed for `payment`, or `None` on overflow
    pub fn checked_quote(&self, payment: Amount) -> Option<Amount> {
        payment.checked_mul(self.0.get())
    }
}

impl TryFrom<u128> for ExchangeRate {
    type Error = NumericError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NumericError::ZeroRate)
    }
}

impl From<ExchangeRate> for u128 {
    fn from(rate: ExchangeRate) -> Self {
        rate.get()
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_rate_rejected() {
        assert!(ExchangeRate::new(0).is_none());
        assert_eq!(ExchangeRate::try_from(0u128), Err(NumericError::ZeroRate));
    }

    #[test]
    fn test_quote() {
        let rate = ExchangeRate::new(100).unwrap();
        assert_eq!(rate.checked_quote(1), Some(100));
        assert_eq!(rate.checked_quote(0), Some(0));
    }

    #[test]
    fn test_quote_overflow() {
        let rate = ExchangeRate::new(2).unwrap();
        assert_eq!(rate.checked_quote(u128::MAX), None);
        assert_eq!(rate.checked_quote(u128::MAX / 2), Some(u128::MAX - 1));
    }

    #[test]
    fn test_rate_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<ExchangeRate>("0").is_err());
        let rate: ExchangeRate = serde_json::from_str("250").unwrap();
        assert_eq!(rate.get(), 250);
    }

    proptest! {
        /// Quoting agrees with widening multiplication whenever it succeeds.
        #[test]
        fn prop_quote_matches_mul(
            rate in 1u128..=u64::MAX as u128,
            payment in 0u128..=u64::MAX as u128,
        ) {
            let r = ExchangeRate::new(rate).unwrap();
            prop_assert_eq!(r.checked_quote(payment), Some(rate * payment));
        }
    }
}
