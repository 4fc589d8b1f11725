//! Fixed-point money arithmetic.
//!
//! All balances, stakes and payouts are integer counts of minor units
//! (two fraction digits), and payout multipliers are integer hundredths.
//! Nothing in the crate does floating-point arithmetic on money.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of minor units in one major currency unit.
pub const MINOR_UNITS_PER_UNIT: u64 = 100;

/// A non-negative amount of money in minor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Construct from a raw count of minor units (e.g. cents).
    pub const fn from_minor_units(units: u64) -> Self {
        Amount(units)
    }

    /// Construct from whole currency units.
    pub const fn from_units(units: u64) -> Self {
        Amount(units * MINOR_UNITS_PER_UNIT)
    }

    pub const fn minor_units(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_UNITS_PER_UNIT,
            self.0 % MINOR_UNITS_PER_UNIT
        )
    }
}

/// Parse error for decimal amount strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount {0:?}: expected a non-negative decimal with at most 2 fraction digits")]
pub struct ParseAmountError(pub String);

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parses `"12"`, `"12.5"` or `"12.50"`. Rejects signs, exponents and
    /// more than two fraction digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAmountError(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() || frac.len() > 2 {
            return Err(err());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let whole: u64 = whole.parse().map_err(|_| err())?;
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| err())? * 10,
            _ => frac.parse().map_err(|_| err())?,
        };

        whole
            .checked_mul(MINOR_UNITS_PER_UNIT)
            .and_then(|m| m.checked_add(frac))
            .map(Amount)
            .ok_or_else(err)
    }
}

/// A payout multiplier in integer hundredths (`350` is 3.5x).
///
/// Zero means no win.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Multiplier(u64);

impl Multiplier {
    pub const ZERO: Multiplier = Multiplier(0);

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Multiplier(hundredths)
    }

    pub const fn from_whole(whole: u64) -> Self {
        Multiplier(whole * 100)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `stake × multiplier`, truncated to minor units.
    ///
    /// Widens to u128 so the intermediate product cannot overflow.
    pub fn payout_on(self, stake: Amount) -> Amount {
        let product = stake.minor_units() as u128 * self.0 as u128 / 100;
        Amount(product as u64)
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parsing() {
        assert_eq!("10".parse::<Amount>().unwrap(), Amount::from_minor_units(1000));
        assert_eq!("10.5".parse::<Amount>().unwrap(), Amount::from_minor_units(1050));
        assert_eq!("10.50".parse::<Amount>().unwrap(), Amount::from_minor_units(1050));
        assert_eq!("0.01".parse::<Amount>().unwrap(), Amount::from_minor_units(1));

        assert!("10.505".parse::<Amount>().is_err());
        assert!("-1".parse::<Amount>().is_err());
        assert!("1e3".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
    }

    #[test]
    fn test_amount_display_round_trips() {
        let amount = Amount::from_minor_units(1205);
        assert_eq!(amount.to_string(), "12.05");
        assert_eq!(amount.to_string().parse::<Amount>().unwrap(), amount);
    }

    #[test]
    fn test_payout_truncates_to_minor_units() {
        // 0.33 * 0.5x = 0.165, truncated to 0.16
        let stake = Amount::from_minor_units(33);
        let half = Multiplier::from_hundredths(50);
        assert_eq!(half.payout_on(stake), Amount::from_minor_units(16));
    }

    #[test]
    fn test_payout_whole_multipliers() {
        let stake = Amount::from_units(10);
        assert_eq!(Multiplier::from_whole(3).payout_on(stake), Amount::from_units(30));
        assert_eq!(Multiplier::from_whole(36).payout_on(stake), Amount::from_units(360));
        assert_eq!(Multiplier::ZERO.payout_on(stake), Amount::ZERO);
    }

    #[test]
    fn test_payout_does_not_overflow() {
        let stake = Amount::from_minor_units(u64::MAX / 100);
        let mult = Multiplier::from_whole(50);
        // Would overflow u64 without the u128 widening; just ensure no panic.
        let _ = mult.payout_on(stake);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::from_minor_units(100);
        let b = Amount::from_minor_units(60);
        assert_eq!(a.checked_sub(b), Some(Amount::from_minor_units(40)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount(u64::MAX).checked_add(Amount(1)), None);
    }
}
