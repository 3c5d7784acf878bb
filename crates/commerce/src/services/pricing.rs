//! Pricing engine.
//!
//! Pure and deterministic: the same lines and policy always produce the
//! same breakdown, with no I/O. The same function prices live cart
//! summaries (current catalog prices) and order creation (captured
//! prices).

use rust_decimal::Decimal;
use serde::Serialize;

use veranda_core::{Money, MoneyError};

/// Store pricing policy, supplied as read-only configuration.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    /// Sales tax rate applied to the subtotal (e.g., `0.08`).
    pub tax_rate: Decimal,
    /// Flat shipping cost below the free-shipping threshold.
    pub shipping_cost: Money,
    /// Subtotal at which shipping is waived.
    pub free_shipping_threshold: Money,
    /// Fractional digits of the store currency.
    pub currency_precision: u32,
}

impl Default for PricingPolicy {
    /// The store defaults: 8% tax, $9.99 flat shipping, free over $75.00.
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            shipping_cost: Money::from_minor(999),
            free_shipping_threshold: Money::from_minor(7500),
            currency_precision: 2,
        }
    }
}

/// One line to be priced: a unit price and how many units.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    /// Per-unit price.
    pub unit_price: Money,
    /// Units of the product.
    pub quantity: i64,
}

/// The result of pricing a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    /// Sum of `unit_price * quantity` over all lines.
    pub subtotal: Money,
    /// Tax on the subtotal, rounded to the currency precision.
    pub tax: Money,
    /// Flat cost, or zero at/above the free-shipping threshold.
    pub shipping: Money,
    /// `subtotal + tax + shipping`.
    pub total: Money,
}

/// Price a set of lines under the store policy.
///
/// A zero subtotal is shipping-exempt: an empty cart summary shows $0.00
/// everywhere rather than owing flat shipping on nothing.
///
/// # Errors
///
/// Returns `MoneyError` if the tax amount cannot be represented in minor
/// units.
pub fn price(lines: &[PricedLine], policy: &PricingPolicy) -> Result<PriceBreakdown, MoneyError> {
    let subtotal: Money = lines
        .iter()
        .map(|line| line.unit_price * line.quantity)
        .sum();

    let tax = Money::from_decimal(
        subtotal.to_decimal(policy.currency_precision) * policy.tax_rate,
        policy.currency_precision,
    )?;

    let shipping = if subtotal == Money::ZERO || subtotal >= policy.free_shipping_threshold {
        Money::ZERO
    } else {
        policy.shipping_cost
    };

    Ok(PriceBreakdown {
        subtotal,
        tax,
        shipping,
        total: subtotal + tax + shipping,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(unit_minor: i64, quantity: i64) -> PricedLine {
        PricedLine {
            unit_price: Money::from_minor(unit_minor),
            quantity,
        }
    }

    #[test]
    fn test_shipping_waived_at_threshold() {
        let policy = PricingPolicy::default();

        // subtotal 80.00 >= 75.00 threshold
        let breakdown = price(&[line(8000, 1)], &policy).unwrap();
        assert_eq!(breakdown.shipping, Money::ZERO);

        // subtotal 50.00 < threshold
        let breakdown = price(&[line(5000, 1)], &policy).unwrap();
        assert_eq!(breakdown.shipping, Money::from_minor(999));

        // exactly at the threshold counts as free
        let breakdown = price(&[line(7500, 1)], &policy).unwrap();
        assert_eq!(breakdown.shipping, Money::ZERO);
    }

    #[test]
    fn test_worked_example() {
        // tax_rate=0.08, cart = [(89.99, 1), (79.99, 2)]
        let policy = PricingPolicy::default();
        let breakdown = price(&[line(8999, 1), line(7999, 2)], &policy).unwrap();

        assert_eq!(breakdown.subtotal, Money::from_minor(24_997));
        // 249.97 * 0.08 = 19.9976, rounded to 20.00
        assert_eq!(breakdown.tax, Money::from_minor(2000));
        assert_eq!(breakdown.shipping, Money::ZERO);
        assert_eq!(breakdown.total, Money::from_minor(26_997));
    }

    #[test]
    fn test_empty_lines_price_to_zero() {
        let breakdown = price(&[], &PricingPolicy::default()).unwrap();
        assert_eq!(breakdown.subtotal, Money::ZERO);
        assert_eq!(breakdown.tax, Money::ZERO);
        assert_eq!(breakdown.shipping, Money::ZERO);
        assert_eq!(breakdown.total, Money::ZERO);
    }

    #[test]
    fn test_deterministic() {
        let policy = PricingPolicy::default();
        let lines = [line(1299, 3), line(499, 1)];
        assert_eq!(price(&lines, &policy).unwrap(), price(&lines, &policy).unwrap());
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let policy = PricingPolicy::default();
        for lines in [vec![line(999, 1)], vec![line(8999, 2), line(7999, 1)]] {
            let b = price(&lines, &policy).unwrap();
            assert_eq!(b.total, b.subtotal + b.tax + b.shipping);
        }
    }
}
