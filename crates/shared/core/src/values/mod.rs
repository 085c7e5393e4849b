use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Asset symbol held in account balances (e.g. "BTC", "BRL")
pub type Asset = String;

/// `a * b`, or `None` if the product overflows or would have to be rounded
pub fn exact_mul(a: Decimal, b: Decimal) -> Option<Decimal> {
    let product = a.checked_mul(b)?;
    (product.scale() == a.scale() + b.scale()).then_some(product)
}

/// `a + b`, or `None` if the sum overflows or would have to be rounded
pub fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    (sum.scale() >= a.scale().max(b.scale())).then_some(sum)
}

/// `a - b`, or `None` if the difference overflows or would have to be rounded
pub fn exact_sub(a: Decimal, b: Decimal) -> Option<Decimal> {
    let difference = a.checked_sub(b)?;
    (difference.scale() >= a.scale().max(b.scale())).then_some(difference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_mul() {
        assert_eq!(exact_mul(dec!(50000), dec!(0.5)), Some(dec!(25000)));
        assert_eq!(exact_mul(dec!(0.00000001), dec!(0.00000001)), Some(dec!(0.0000000000000001)));
    }

    #[test]
    fn test_exact_mul_refuses_rounding() {
        // 1e-16 * 1e-16 needs 32 decimal places
        let tiny = dec!(0.0000000000000001);
        assert_eq!(exact_mul(tiny, tiny), None);
    }

    #[test]
    fn test_exact_mul_refuses_overflow() {
        assert_eq!(exact_mul(dec!(10000000000000000000), dec!(10000000000000)), None);
        assert_eq!(exact_mul(Decimal::MAX, dec!(2)), None);
    }

    #[test]
    fn test_exact_add_and_sub() {
        assert_eq!(exact_add(dec!(1.5), dec!(0.25)), Some(dec!(1.75)));
        assert_eq!(exact_add(Decimal::MAX, Decimal::ONE), None);
        assert_eq!(exact_sub(dec!(1), dec!(0.75)), Some(dec!(0.25)));
        assert_eq!(exact_sub(Decimal::MIN, Decimal::ONE), None);
    }

    #[test]
    fn test_exact_add_refuses_lost_digits() {
        // 29 significant digits do not fit
        let large = dec!(10000000000000000000000);
        let small = dec!(0.0000001);
        assert_eq!(exact_add(large, small), None);
    }
}
