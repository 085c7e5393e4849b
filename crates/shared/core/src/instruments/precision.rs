use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest scale a `Decimal` can carry
pub const MAX_SCALE: u32 = 28;

/// Decimal places allowed for prices and quantities on an instrument
///
/// With `price_scale + quantity_scale <= 28` and every notional kept under
/// `max_notional()`, each product and sum the venue computes fits a
/// `Decimal` without rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    #[serde(default = "default_scale")]
    pub price_scale: u32,
    #[serde(default = "default_scale")]
    pub quantity_scale: u32,
}

fn default_scale() -> u32 {
    8
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            price_scale: default_scale(),
            quantity_scale: default_scale(),
        }
    }
}

impl Precision {
    pub fn new(price_scale: u32, quantity_scale: u32) -> Self {
        Self {
            price_scale,
            quantity_scale,
        }
    }

    /// Decimal places of a notional (price x quantity)
    pub fn amount_scale(&self) -> u32 {
        self.price_scale.saturating_add(self.quantity_scale)
    }

    pub fn is_valid(&self) -> bool {
        self.amount_scale() <= MAX_SCALE
    }

    /// Largest whole amount whose digits at `amount_scale()` still fit a `Decimal`
    pub fn max_notional(&self) -> Decimal {
        let scale = self.amount_scale().min(MAX_SCALE);
        Decimal::from_i128_with_scale(Decimal::MAX.mantissa(), scale).trunc()
    }

    pub fn fits_price(&self, price: Decimal) -> bool {
        price.normalize().scale() <= self.price_scale
    }

    pub fn fits_quantity(&self, quantity: Decimal) -> bool {
        quantity.normalize().scale() <= self.quantity_scale
    }

    /// Balance movements are notionals or quantities, so they share the notional scale
    pub fn fits_amount(&self, amount: Decimal) -> bool {
        amount.normalize().scale() <= self.amount_scale() && amount <= self.max_notional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_precision() {
        let precision = Precision::default();
        assert_eq!(precision.amount_scale(), 16);
        assert!(precision.is_valid());
        assert_eq!(precision.max_notional(), dec!(7922816251426));
    }

    #[test]
    fn test_trailing_zeros_do_not_count() {
        let precision = Precision::new(2, 2);
        assert!(precision.fits_price(dec!(100.5000)));
        assert!(!precision.fits_price(dec!(100.505)));
        assert!(precision.fits_quantity(dec!(0.01)));
        assert!(!precision.fits_quantity(dec!(0.001)));
    }

    #[test]
    fn test_amount_limits() {
        let precision = Precision::default();
        assert!(precision.fits_amount(dec!(1000000)));
        assert!(!precision.fits_amount(dec!(0.00000000000000001)));
        assert!(!precision.fits_amount(dec!(10000000000000)));
    }

    #[test]
    fn test_scales_beyond_decimal_are_invalid() {
        assert!(Precision::new(14, 14).is_valid());
        assert!(!Precision::new(20, 10).is_valid());
        assert_eq!(Precision::new(20, 10).max_notional(), dec!(7));
    }
}
