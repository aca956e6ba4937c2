//! Price ranges using decimal arithmetic.
//!
//! Every package is priced as a `[min, max]` range in USD. Fixed-price
//! packages simply have `min == max`. Cart totals are ranges too, so the
//! same type carries both.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A minimum/maximum price pair in USD.
///
/// `min <= max` is expected but not enforced; the catalog is curated by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound of the price.
    pub min: Decimal,
    /// Upper bound of the price.
    pub max: Decimal,
}

impl PriceRange {
    /// The empty total.
    pub const ZERO: Self = Self {
        min: Decimal::ZERO,
        max: Decimal::ZERO,
    };

    /// Create a new price range.
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Create a fixed price (`min == max`).
    #[must_use]
    pub const fn fixed(amount: Decimal) -> Self {
        Self {
            min: amount,
            max: amount,
        }
    }

    /// Whether the range collapses to a single price.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Scale both bounds by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        let q = Decimal::from(quantity);
        Self {
            min: self.min * q,
            max: self.max * q,
        }
    }

    /// Human-readable price.
    ///
    /// Fixed prices keep cents (`$1,500.00`); ranges are shown in whole
    /// dollars (`$1,000 - $2,500`).
    #[must_use]
    pub fn display(&self) -> String {
        if self.is_fixed() {
            format_usd(self.min, 2)
        } else {
            format!("{} - {}", format_usd(self.min, 0), format_usd(self.max, 0))
        }
    }
}

impl Add for PriceRange {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            min: self.min + rhs.min,
            max: self.max + rhs.max,
        }
    }
}

impl Sum for PriceRange {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Format a USD amount with thousands separators and a fixed number of
/// decimal places.
///
/// Rounds half to even, so `$2.5` shown without cents is `$2`.
///
/// ```
/// use rust_decimal::Decimal;
/// use servicecart_core::format_usd;
///
/// assert_eq!(format_usd(Decimal::new(123_456_7, 1), 2), "$123,456.70");
/// assert_eq!(format_usd(Decimal::new(25, 1), 0), "$2");
/// ```
#[must_use]
pub fn format_usd(amount: Decimal, decimals: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (whole, fraction) = digits
        .split_once('.')
        .map_or((digits.as_str(), None), |(w, f)| (w, Some(f)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{sign}${grouped}.{f}"),
        None => format!("{sign}${grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    #[test]
    fn test_format_usd_groups_thousands() {
        assert_eq!(format_usd(dec("0"), 2), "$0.00");
        assert_eq!(format_usd(dec("999.5"), 2), "$999.50");
        assert_eq!(format_usd(dec("1000"), 2), "$1,000.00");
        assert_eq!(format_usd(dec("1234567.891"), 2), "$1,234,567.89");
    }

    #[test]
    fn test_format_usd_whole_dollars_rounds_half_even() {
        assert_eq!(format_usd(dec("2.5"), 0), "$2");
        assert_eq!(format_usd(dec("3.5"), 0), "$4");
        assert_eq!(format_usd(dec("12999.99"), 0), "$13,000");
    }

    #[test]
    fn test_format_usd_negative() {
        assert_eq!(format_usd(dec("-1500"), 2), "-$1,500.00");
    }

    #[test]
    fn test_display_fixed_price_keeps_cents() {
        let price = PriceRange::fixed(dec("1500"));
        assert!(price.is_fixed());
        assert_eq!(price.display(), "$1,500.00");
    }

    #[test]
    fn test_display_range_whole_dollars() {
        let price = PriceRange::new(dec("1000"), dec("2500.00"));
        assert!(!price.is_fixed());
        assert_eq!(price.display(), "$1,000 - $2,500");
    }

    #[test]
    fn test_equal_bounds_with_different_scale_are_fixed() {
        let price = PriceRange::new(dec("50"), dec("50.00"));
        assert!(price.is_fixed());
        assert_eq!(price.display(), "$50.00");
    }

    #[test]
    fn test_times_and_sum() {
        let a = PriceRange::new(dec("100"), dec("150")).times(2);
        let b = PriceRange::fixed(dec("50")).times(1);
        let total: PriceRange = [a, b].into_iter().sum();
        assert_eq!(total, PriceRange::new(dec("250"), dec("350")));
    }

    #[test]
    fn test_times_zero_is_zero() {
        let price = PriceRange::new(dec("10"), dec("20")).times(0);
        assert_eq!(price, PriceRange::ZERO);
    }
}
