//! Money Module
//!
//! Exact fixed-point amounts for balances and transfer amounts.
//!
//! ## Representation
//! - Backed by `rust_decimal::Decimal`, never binary floating point
//! - Always rescaled to [`SCALE`] fractional digits (storage is `NUMERIC(20,5)`)
//! - Upper bound is [`Money::max_balance`]: 15 integer digits, 5 fractional digits
//!
//! ## Overflow Policy
//! `Money` does not clamp. Callers check [`Money::exceeds_max_balance`] on any
//! value that is about to be written as a balance.
//!
//! ## Usage
//! ```rust
//! use internal_transfers::money::Money;
//!
//! let balance = Money::parse("100.00").unwrap();
//! let amount = Money::parse("30").unwrap();
//! let rest = balance.checked_sub(amount).unwrap();
//! assert_eq!(rest.to_string(), "70.00000");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fractional digits carried by every amount.
pub const SCALE: u32 = 5;

/// Maximum number of integer digits a balance may have.
pub const MAX_INTEGER_DIGITS: u32 = 15;

// ============================================================================
// Error Types
// ============================================================================

/// Money parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("empty amount")]
    Empty,

    #[error("not a decimal numeral: '{0}'")]
    NotANumber(String),

    #[error("precision overflow: {provided} fractional digits, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("amount out of representable range")]
    OutOfRange,
}

// ============================================================================
// Money
// ============================================================================

/// Exact decimal amount with a fixed scale of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Largest balance the storage column can hold: 999999999999999.99999
    pub fn max_balance() -> Self {
        Self(Decimal::from_i128_with_scale(99_999_999_999_999_999_999, SCALE))
    }

    /// Parse a client-supplied decimal numeral.
    ///
    /// # Validation Rules
    /// - Optional leading `+` or `-`
    /// - At least one integer digit; `.5` is rejected
    /// - If a `.` is present it must be followed by at least one digit; `5.` is rejected
    /// - At most [`SCALE`] fractional digits (no silent rounding)
    /// - No exponents, underscores or inner whitespace
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MoneyError::Empty);
        }

        let unsigned = text
            .strip_prefix('-')
            .or_else(|| text.strip_prefix('+'))
            .unwrap_or(text);

        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (unsigned, None),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || frac.is_some_and(|f| !all_digits(f)) {
            return Err(MoneyError::NotANumber(text.to_string()));
        }

        if let Some(frac) = frac
            && frac.len() > SCALE as usize
        {
            return Err(MoneyError::PrecisionOverflow {
                provided: frac.len() as u32,
                max: SCALE,
            });
        }

        let mut decimal = Decimal::from_str(unsigned).map_err(|_| MoneyError::OutOfRange)?;
        decimal.set_sign_negative(text.starts_with('-'));
        Self::from_decimal(decimal)
    }

    /// Wrap a decimal read back from storage, normalizing it to [`SCALE`].
    pub fn from_decimal(decimal: Decimal) -> Result<Self, MoneyError> {
        if decimal.scale() > SCALE && decimal.round_dp(SCALE) != decimal {
            return Err(MoneyError::PrecisionOverflow {
                provided: decimal.scale(),
                max: SCALE,
            });
        }

        let mut value = if decimal.is_zero() {
            Decimal::ZERO
        } else {
            decimal
        };
        value.rescale(SCALE);
        // rescale() silently gives up when the mantissa cannot hold the extra digits
        if value.scale() != SCALE {
            return Err(MoneyError::OutOfRange);
        }
        Ok(Self(value))
    }

    /// Underlying decimal, for binding to SQL parameters.
    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_negative()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_positive()
    }

    /// `true` when this value cannot be stored as a balance.
    #[inline]
    pub fn exceeds_max_balance(&self) -> bool {
        *self > Self::max_balance()
    }

    /// Exact addition; `None` only if the decimal mantissa overflows.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Exact subtraction; the result may be negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.prec$}", self.0, prec = SCALE as usize)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::from_decimal(value)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Money::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_canonical_scale() {
        assert_eq!(Money::parse("100.00").unwrap().to_string(), "100.00000");
        assert_eq!(Money::parse("30").unwrap().to_string(), "30.00000");
        assert_eq!(Money::parse("0.00001").unwrap().to_string(), "0.00001");
        assert_eq!(Money::parse("+7.5").unwrap().to_string(), "7.50000");
        assert_eq!(Money::parse("  12.5 ").unwrap().to_string(), "12.50000");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "abc", ".5", "5.", "1e5", "1_000", "1.2.3", "--1", "1 000", "0x10"] {
            assert!(Money::parse(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert_eq!(
            Money::parse("1.000001"),
            Err(MoneyError::PrecisionOverflow {
                provided: 6,
                max: 5
            })
        );
    }

    #[test]
    fn test_parse_rejects_unrepresentable() {
        let huge = "9".repeat(40);
        assert_eq!(Money::parse(&huge), Err(MoneyError::OutOfRange));
    }

    #[test]
    fn test_negative_and_zero() {
        let neg = Money::parse("-5.00").unwrap();
        assert!(neg.is_negative());
        assert!(!neg.is_positive());

        let neg_zero = Money::parse("-0.00").unwrap();
        assert!(neg_zero.is_zero());
        assert!(!neg_zero.is_negative());
        assert_eq!(neg_zero.to_string(), "0.00000");
    }

    #[test]
    fn test_max_balance_bound() {
        let max = Money::max_balance();
        assert_eq!(max.to_string(), "999999999999999.99999");
        assert!(!max.exceeds_max_balance());

        let above = max.checked_add(Money::parse("0.00001").unwrap()).unwrap();
        assert!(above.exceeds_max_balance());
        assert!(Money::parse("1000000000000000").unwrap().exceeds_max_balance());
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = Money::parse("0.1").unwrap();
        let b = Money::parse("0.2").unwrap();
        assert_eq!(a.checked_add(b).unwrap(), Money::parse("0.3").unwrap());

        let rest = Money::parse("100.00")
            .unwrap()
            .checked_sub(Money::parse("30.00").unwrap())
            .unwrap();
        assert_eq!(rest.to_string(), "70.00000");
        assert!(a < b);
    }

    #[test]
    fn test_from_decimal_normalizes_scale() {
        let m = Money::from_decimal(dec!(42.1)).unwrap();
        assert_eq!(m.as_decimal().scale(), SCALE);
        assert_eq!(m.to_string(), "42.10000");

        // trailing zeros beyond the scale are harmless
        assert!(Money::from_decimal(dec!(1.1000000)).is_ok());
        assert!(Money::from_decimal(dec!(1.123456)).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let m = Money::parse("12.5").unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"12.50000\"");
        let back: Money = serde_json::from_str("\"12.50000\"").unwrap();
        assert_eq!(back, m);
    }
}
