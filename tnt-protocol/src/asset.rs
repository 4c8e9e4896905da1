//! Asset quantities and exchange prices
//!
//! An [`Asset`] is a documentary amount tagged with its kind. Combining two
//! amounts of different kinds is a caller bug, so the operators panic on a
//! kind mismatch instead of returning an error.
//!
//! A [`Price`] is a ratio `base / quote`. Multiplying an asset by a price
//! converts it into the other side of the ratio using 128-bit intermediates;
//! `*` rounds down and [`Asset::multiply_and_round_up`] rounds up.

use crate::types::AssetId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Not, Sub, SubAssign};

/// Signed share amount
pub type ShareType = i64;

/// Upper bound on the supply of any single asset
pub const MAX_SHARE_SUPPLY: ShareType = 1_000_000_000_000_000;

/// Highest decimal precision an asset may declare
pub const MAX_PRECISION: u8 = 18;

/// `10^precision` for every supported precision
const SCALED_PRECISION_LUT: [ShareType; MAX_PRECISION as usize + 1] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// An amount of one asset kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Asset {
    /// Amount in the asset's smallest unit
    pub amount: ShareType,
    /// Asset kind
    pub asset_id: AssetId,
}

impl Asset {
    /// Create new asset amount
    pub fn new(amount: ShareType, asset_id: AssetId) -> Self {
        Self { amount, asset_id }
    }

    /// `10^precision`
    ///
    /// # Panics
    ///
    /// If `precision` exceeds [`MAX_PRECISION`].
    pub fn scaled_precision(precision: u8) -> ShareType {
        assert!(
            precision <= MAX_PRECISION,
            "precision {} exceeds maximum of {}",
            precision,
            MAX_PRECISION
        );
        SCALED_PRECISION_LUT[usize::from(precision)]
    }

    /// Multiply by a price, rounding up
    ///
    /// Used where rounding must favour the creditor.
    pub fn multiply_and_round_up(&self, price: &Price) -> Asset {
        self.convert(price, true)
    }

    fn assert_same_kind(&self, other: &Asset, op: &str) {
        assert_eq!(
            self.asset_id, other.asset_id,
            "asset kind mismatch in {}: {} vs {}",
            op, self, other
        );
    }

    fn convert(&self, price: &Price, round_up: bool) -> Asset {
        let (from, to) = if self.asset_id == price.base.asset_id {
            (price.base, price.quote)
        } else if self.asset_id == price.quote.asset_id {
            (price.quote, price.base)
        } else {
            panic!("invalid asset * price: {} is on neither side of {}", self, price);
        };
        assert!(from.amount > 0, "price side {} must be positive", from);

        let numerator = i128::from(self.amount) * i128::from(to.amount);
        let denominator = i128::from(from.amount);
        let result = if round_up {
            -((-numerator).div_euclid(denominator))
        } else {
            numerator.div_euclid(denominator)
        };
        assert!(
            result <= i128::from(MAX_SHARE_SUPPLY),
            "{} * {} exceeds maximum share supply",
            self,
            price
        );
        // Bounded above by MAX_SHARE_SUPPLY; bounded below by the i64 inputs.
        Asset::new(result as ShareType, to.asset_id)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset_id)
    }
}

impl Add for Asset {
    type Output = Asset;

    fn add(self, rhs: Asset) -> Asset {
        self.assert_same_kind(&rhs, "addition");
        let amount = self
            .amount
            .checked_add(rhs.amount)
            .unwrap_or_else(|| panic!("overflow adding {} and {}", self, rhs));
        Asset::new(amount, self.asset_id)
    }
}

impl Sub for Asset {
    type Output = Asset;

    fn sub(self, rhs: Asset) -> Asset {
        self.assert_same_kind(&rhs, "subtraction");
        let amount = self
            .amount
            .checked_sub(rhs.amount)
            .unwrap_or_else(|| panic!("overflow subtracting {} from {}", rhs, self));
        Asset::new(amount, self.asset_id)
    }
}

impl AddAssign for Asset {
    fn add_assign(&mut self, rhs: Asset) {
        *self = *self + rhs;
    }
}

impl SubAssign for Asset {
    fn sub_assign(&mut self, rhs: Asset) {
        *self = *self - rhs;
    }
}

impl Neg for Asset {
    type Output = Asset;

    fn neg(self) -> Asset {
        Asset::new(-self.amount, self.asset_id)
    }
}

/// Ordering is only defined between amounts of the same kind
impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Asset) -> Option<Ordering> {
        self.assert_same_kind(other, "comparison");
        Some(self.amount.cmp(&other.amount))
    }
}

/// Build a price from two amounts of different kinds
impl Div for Asset {
    type Output = Price;

    fn div(self, quote: Asset) -> Price {
        assert_ne!(
            self.asset_id, quote.asset_id,
            "cannot build a price from two amounts of {}",
            self.asset_id
        );
        Price::new(self, quote)
    }
}

/// Multiply by a price, rounding down
impl Mul<Price> for Asset {
    type Output = Asset;

    fn mul(self, price: Price) -> Asset {
        self.convert(&price, false)
    }
}

/// Exchange ratio between two assets, expressed as `base / quote`
///
/// Prices are not stored reduced: `(1000 A) / (20 B)` is a normal price.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Price {
    /// Numerator side
    pub base: Asset,
    /// Denominator side
    pub quote: Asset,
}

impl Price {
    /// Create new price
    pub fn new(base: Asset, quote: Asset) -> Self {
        Self { base, quote }
    }

    /// Price of one unit of `asset` in itself; `m * unit == m` for any `m`
    pub fn unit_price(asset: AssetId) -> Self {
        Self::new(Asset::new(1, asset), Asset::new(1, asset))
    }

    /// Highest representable price between two assets
    pub fn max(base: AssetId, quote: AssetId) -> Self {
        Self::new(Asset::new(MAX_SHARE_SUPPLY, base), Asset::new(1, quote))
    }

    /// Lowest positive representable price between two assets
    pub fn min(base: AssetId, quote: AssetId) -> Self {
        Self::new(Asset::new(1, base), Asset::new(MAX_SHARE_SUPPLY, quote))
    }

    /// Ratio as a float
    pub fn to_real(&self) -> f64 {
        self.base.amount as f64 / self.quote.amount as f64
    }

    /// Swap base and quote
    pub fn invert(&self) -> Self {
        Self::new(self.quote, self.base)
    }

    /// Whether both sides are empty
    pub fn is_null(&self) -> bool {
        self.base.amount == 0 && self.quote.amount == 0
    }

    /// Check the price is usable for conversion
    ///
    /// # Panics
    ///
    /// If either side is not positive or both sides have the same kind.
    pub fn validate(&self) {
        assert!(self.base.amount > 0, "price base {} must be positive", self.base);
        assert!(self.quote.amount > 0, "price quote {} must be positive", self.quote);
        assert_ne!(
            self.base.asset_id, self.quote.asset_id,
            "price base and quote must differ"
        );
    }

    fn cross(&self, other: &Price) -> (i128, i128) {
        (
            i128::from(self.base.amount) * i128::from(other.quote.amount),
            i128::from(other.base.amount) * i128::from(self.quote.amount),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.base, self.quote)
    }
}

/// Inversion, `!p` swaps base and quote
impl Not for Price {
    type Output = Price;

    fn not(self) -> Price {
        self.invert()
    }
}

/// Equal ratios over the same asset pair
impl PartialEq for Price {
    fn eq(&self, other: &Price) -> bool {
        if self.base.asset_id != other.base.asset_id || self.quote.asset_id != other.quote.asset_id
        {
            return false;
        }
        let (lhs, rhs) = self.cross(other);
        lhs == rhs
    }
}

/// Orders by base kind, then quote kind, then ratio
impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Price) -> Option<Ordering> {
        let by_kind = self
            .base
            .asset_id
            .cmp(&other.base.asset_id)
            .then(self.quote.asset_id.cmp(&other.quote.asset_id));
        if by_kind != Ordering::Equal {
            return Some(by_kind);
        }
        let (lhs, rhs) = self.cross(other);
        Some(lhs.cmp(&rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: AssetId = AssetId(0);
    const USD: AssetId = AssetId(1);

    #[test]
    fn test_scaled_precision() {
        assert_eq!(Asset::scaled_precision(0), 1);
        assert_eq!(Asset::scaled_precision(5), 100_000);
        assert_eq!(Asset::scaled_precision(18), 1_000_000_000_000_000_000);
    }

    #[test]
    #[should_panic(expected = "exceeds maximum")]
    fn test_scaled_precision_out_of_range() {
        Asset::scaled_precision(19);
    }

    #[test]
    fn test_asset_arithmetic() {
        let a = Asset::new(100, CORE);
        let b = Asset::new(40, CORE);
        assert_eq!(a + b, Asset::new(140, CORE));
        assert_eq!(a - b, Asset::new(60, CORE));
        assert_eq!(-a, Asset::new(-100, CORE));

        let mut c = a;
        c += b;
        c -= Asset::new(10, CORE);
        assert_eq!(c.amount, 130);
        assert!(b < a);
    }

    #[test]
    #[should_panic(expected = "asset kind mismatch")]
    fn test_mismatched_addition() {
        let _ = Asset::new(1, CORE) + Asset::new(1, USD);
    }

    #[test]
    #[should_panic(expected = "asset kind mismatch")]
    fn test_mismatched_comparison() {
        let _ = Asset::new(1, CORE) < Asset::new(1, USD);
    }

    #[test]
    fn test_multiply_rounding() {
        // 3 CORE buys 7 USD
        let price = Asset::new(3, CORE) / Asset::new(7, USD);

        let core = Asset::new(10, CORE);
        assert_eq!(core * price, Asset::new(23, USD));
        assert_eq!(core.multiply_and_round_up(&price), Asset::new(24, USD));

        let usd = Asset::new(10, USD);
        assert_eq!(usd * price, Asset::new(4, CORE));
        assert_eq!(usd.multiply_and_round_up(&price), Asset::new(5, CORE));

        // Exact conversions do not round
        let exact = Asset::new(21, USD);
        assert_eq!(exact.multiply_and_round_up(&price), Asset::new(9, CORE));
    }

    #[test]
    fn test_multiply_wide_intermediate() {
        // The product overflows i64 but the quotient does not
        let price = Asset::new(MAX_SHARE_SUPPLY, CORE) / Asset::new(MAX_SHARE_SUPPLY, USD);
        let amount = Asset::new(MAX_SHARE_SUPPLY, CORE);
        assert_eq!(amount * price, Asset::new(MAX_SHARE_SUPPLY, USD));
    }

    #[test]
    #[should_panic(expected = "neither side")]
    fn test_multiply_unrelated_asset() {
        let price = Asset::new(3, CORE) / Asset::new(7, USD);
        let _ = Asset::new(1, AssetId(9)) * price;
    }

    #[test]
    fn test_price_inversion_and_comparison() {
        let price = Asset::new(1000, CORE) / Asset::new(20, USD);
        assert_eq!(!!price, price);
        assert!((price.to_real() - 50.0).abs() < f64::EPSILON);
        assert!((price.invert().to_real() - 0.02).abs() < 1e-12);

        let same_ratio = Asset::new(50, CORE) / Asset::new(1, USD);
        assert_eq!(price, same_ratio);

        let cheaper = Asset::new(40, CORE) / Asset::new(1, USD);
        assert!(cheaper < price);
        assert!(Price::min(CORE, USD) < Price::max(CORE, USD));
        assert_ne!(price, !price);
    }

    #[test]
    fn test_unit_and_null_prices() {
        let unit = Price::unit_price(CORE);
        assert_eq!(Asset::new(77, CORE) * unit, Asset::new(77, CORE));
        assert!(Price::default().is_null());
        assert!(!unit.is_null());
    }

    #[test]
    #[should_panic(expected = "must differ")]
    fn test_validate_same_kind() {
        Price::unit_price(CORE).validate();
    }
}
