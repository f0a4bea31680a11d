//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding the
//! floating-point drift that plagues spread and threshold comparisons.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations. `Price::ZERO` doubles as the
/// "no live quote" sentinel in per-side quote state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Midpoint between this price and another.
    #[inline]
    pub fn midpoint(&self, other: Price) -> Self {
        Self((self.0 + other.0) / Decimal::TWO)
    }

    /// Relative change from another price: `(self - other) / other`.
    ///
    /// Returns None when `other` is zero (e.g. the unquoted sentinel).
    #[inline]
    pub fn ratio_from(&self, other: Price) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        Some((self.0 - other.0) / other.0)
    }

    /// Absolute distance to another price.
    #[inline]
    pub fn abs_distance(&self, other: Price) -> Decimal {
        (self.0 - other.0).abs()
    }

    #[inline]
    pub fn min(self, other: Price) -> Self {
        Self(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Price) -> Self {
        Self(self.0.max(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Size/quantity with exact decimal precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Notional value: size * price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Mul<Decimal> for Size {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_midpoint() {
        let p1 = Price::new(dec!(100));
        let p2 = Price::new(dec!(102));
        assert_eq!(p1.midpoint(p2).inner(), dec!(101));
    }

    #[test]
    fn test_price_ratio_from() {
        let last = Price::new(dec!(100));
        let next = Price::new(dec!(100.5));
        assert_eq!(next.ratio_from(last).unwrap(), dec!(0.005));
        assert!(next.ratio_from(Price::ZERO).is_none());
    }

    #[test]
    fn test_price_sentinel() {
        assert!(Price::ZERO.is_zero());
        assert!(!Price::ZERO.is_positive());
        assert!(Price::new(dec!(0.01)).is_positive());
    }

    #[test]
    fn test_notional() {
        let size = Size::new(dec!(0.5));
        let price = Price::new(dec!(22));
        assert_eq!(size.notional(price), dec!(11));
    }

    #[test]
    fn test_abs_distance() {
        let a = Price::new(dec!(24.99));
        let b = Price::new(dec!(25.01));
        assert_eq!(a.abs_distance(b), dec!(0.02));
        assert_eq!(b.abs_distance(a), dec!(0.02));
    }
}
