//! # Pricing Module
//!
//! The pricing/discount calculator. Every screen that shows a price goes
//! through these four operations:
//!
//! | Operation | Used by |
//! |---|---|
//! | [`discounted_unit_price`] | product card, product detail |
//! | [`line_amounts`] | add to cart, quantity change |
//! | [`cart_summary`] | cart, checkout |
//! | [`percentage_equivalent`] | "-20%" badge |
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  unit_price ──┐                                                         │
//! │               ├──► discounted_unit_price ──► × quantity ──► total       │
//! │  discount ────┘            │                                            │
//! │                            └── < 0 ? ──► NegativePricePolicy            │
//! │                                                                         │
//! │  unit_price × quantity ───────────────────────────────────► subtotal    │
//! │                                                                         │
//! │  Σ subtotal, Σ total ──► CartSummary { discount = subtotal − total }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts are integer cents, so `discount = subtotal − total` holds
//! exactly at every level. Percent discounts round to the nearest cent
//! once, on the unit price, before multiplying by the quantity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartSummary, Discount, DiscountRate, LineAmounts, LineItem};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Rules
// =============================================================================

/// What to do when a fixed discount exceeds the unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NegativePricePolicy {
    /// Discounted unit price floors at zero.
    #[default]
    Clamp,
    /// Keep the negative price, as the legacy screens did.
    Passthrough,
}

impl fmt::Display for NegativePricePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegativePricePolicy::Clamp => write!(f, "clamp"),
            NegativePricePolicy::Passthrough => write!(f, "passthrough"),
        }
    }
}

impl FromStr for NegativePricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(NegativePricePolicy::Clamp),
            "passthrough" => Ok(NegativePricePolicy::Passthrough),
            other => Err(format!(
                "Unknown negative price policy: '{}'. Valid options: clamp, passthrough",
                other
            )),
        }
    }
}

/// Tunables for the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingRules {
    pub negative_price: NegativePricePolicy,
    pub max_item_quantity: i64,
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            negative_price: NegativePricePolicy::Clamp,
            max_item_quantity: MAX_ITEM_QUANTITY,
        }
    }
}

impl PricingRules {
    /// Unit price after the discount.
    ///
    /// ## Errors
    /// - `InvalidPrice` if the unit price is zero or negative
    /// - `InvalidDiscountAmount` for a negative fixed amount or a rate above 100%
    pub fn discounted_unit_price(&self, unit_price: Money, discount: &Discount) -> CoreResult<Money> {
        ensure_price(unit_price)?;

        let discounted = match discount {
            Discount::Percent(rate) => {
                ensure_rate(*rate)?;
                unit_price - unit_price.basis_points(rate.bps())
            }
            Discount::Fixed(amount) => {
                if amount.is_negative() {
                    return Err(CoreError::InvalidDiscountAmount {
                        reason: format!("fixed amount {} is negative", amount),
                    });
                }
                unit_price - *amount
            }
        };

        Ok(match self.negative_price {
            NegativePricePolicy::Clamp => discounted.clamp_non_negative(),
            NegativePricePolicy::Passthrough => discounted,
        })
    }

    /// Subtotal and total for one line.
    ///
    /// ## Errors
    /// - `InvalidQuantity` / `QuantityTooLarge` for a quantity outside the rules
    /// - `AmountOverflow` if price × quantity leaves the cent range
    /// - anything [`Self::discounted_unit_price`] rejects
    pub fn line_amounts(
        &self,
        unit_price: Money,
        quantity: i64,
        discount: &Discount,
    ) -> CoreResult<LineAmounts> {
        self.ensure_quantity(quantity)?;
        let discounted = self.discounted_unit_price(unit_price, discount)?;

        let amounts = LineAmounts {
            subtotal: unit_price
                .checked_multiply_quantity(quantity)
                .ok_or(CoreError::AmountOverflow)?,
            total: discounted
                .checked_multiply_quantity(quantity)
                .ok_or(CoreError::AmountOverflow)?,
        };
        // A passthrough total can be negative enough that the discount overflows
        amounts.discount()?;

        Ok(amounts)
    }

    /// Amounts for a [`LineItem`].
    #[inline]
    pub fn amounts_for(&self, line: &LineItem) -> CoreResult<LineAmounts> {
        self.line_amounts(line.unit_price, line.quantity, &line.discount)
    }

    /// Aggregate summary of a cart. Fails on the first invalid line.
    pub fn cart_summary(&self, lines: &[LineItem]) -> CoreResult<CartSummary> {
        let amounts = lines
            .iter()
            .map(|line| self.amounts_for(line))
            .collect::<CoreResult<Vec<_>>>()?;

        CartSummary::from_amounts(amounts)
    }

    fn ensure_quantity(&self, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity(quantity));
        }
        if quantity > self.max_item_quantity {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: self.max_item_quantity,
            });
        }
        Ok(())
    }
}

fn ensure_rate(rate: DiscountRate) -> CoreResult<()> {
    if rate.bps() > 10000 {
        return Err(CoreError::InvalidDiscountAmount {
            reason: format!("rate of {} bps exceeds 100%", rate.bps()),
        });
    }
    Ok(())
}

fn ensure_price(unit_price: Money) -> CoreResult<()> {
    if !unit_price.is_positive() {
        return Err(CoreError::InvalidPrice {
            cents: unit_price.cents(),
        });
    }
    Ok(())
}

// =============================================================================
// Operations (default rules)
// =============================================================================

/// Unit price after the discount, clamped at zero.
///
/// ## Example
/// ```rust
/// use storefront_core::pricing::discounted_unit_price;
/// use storefront_core::types::{Discount, DiscountRate};
/// use storefront_core::Money;
///
/// let price = Money::from_cents(10000);
/// let off_20 = Discount::Percent(DiscountRate::from_percent(20));
/// assert_eq!(discounted_unit_price(price, &off_20).unwrap().cents(), 8000);
///
/// let way_off = Discount::Fixed(Money::from_cents(15000));
/// assert_eq!(discounted_unit_price(price, &way_off).unwrap(), Money::zero());
/// ```
pub fn discounted_unit_price(unit_price: Money, discount: &Discount) -> CoreResult<Money> {
    PricingRules::default().discounted_unit_price(unit_price, discount)
}

/// Subtotal (`unit × qty`) and total (`discounted unit × qty`) for a line.
///
/// ## Example
/// ```rust
/// use storefront_core::pricing::line_amounts;
/// use storefront_core::types::Discount;
/// use storefront_core::Money;
///
/// let amounts = line_amounts(
///     Money::from_cents(5000),
///     2,
///     &Discount::Fixed(Money::from_cents(1000)),
/// ).unwrap();
/// assert_eq!(amounts.subtotal.cents(), 10000);
/// assert_eq!(amounts.total.cents(), 8000);
/// ```
pub fn line_amounts(unit_price: Money, quantity: i64, discount: &Discount) -> CoreResult<LineAmounts> {
    PricingRules::default().line_amounts(unit_price, quantity, discount)
}

/// Aggregate subtotal, discount, total and line count.
///
/// Fails on the first line [`line_amounts`] rejects, or with
/// `AmountOverflow` if the cart totals leave the cent range.
pub fn cart_summary(lines: &[LineItem]) -> CoreResult<CartSummary> {
    PricingRules::default().cart_summary(lines)
}

/// The discount expressed as a whole percentage of the unit price.
///
/// ## Rules
/// - Percent: the rate itself, rounded to a whole percent
/// - Fixed: `round(amount / unit_price × 100)`, half rounds up
///
/// ## Errors
/// - `DivisionUndefined` for a fixed discount on a zero price
/// - `InvalidPrice` for a negative price
/// - `InvalidDiscountAmount` for a rate above 100% or a negative amount
///
/// ## Example
/// ```rust
/// use storefront_core::pricing::percentage_equivalent;
/// use storefront_core::types::Discount;
/// use storefront_core::{CoreError, Money};
///
/// let fixed = Discount::Fixed(Money::from_cents(1000));
/// assert_eq!(percentage_equivalent(&fixed, Money::from_cents(3000)).unwrap(), 33);
/// assert_eq!(
///     percentage_equivalent(&fixed, Money::zero()),
///     Err(CoreError::DivisionUndefined)
/// );
/// ```
pub fn percentage_equivalent(discount: &Discount, unit_price: Money) -> CoreResult<u32> {
    if unit_price.is_negative() {
        return Err(CoreError::InvalidPrice {
            cents: unit_price.cents(),
        });
    }

    match discount {
        Discount::Percent(rate) => {
            ensure_rate(*rate)?;
            Ok((rate.bps() + 50) / 100)
        }
        Discount::Fixed(amount) => {
            if unit_price.is_zero() {
                return Err(CoreError::DivisionUndefined);
            }
            if amount.is_negative() {
                return Err(CoreError::InvalidDiscountAmount {
                    reason: format!("fixed amount {} is negative", amount),
                });
            }

            // round(a × 100 / p) == (2 × a × 100 + p) / (2 × p) for a, p ≥ 0
            let a = amount.cents() as i128;
            let p = unit_price.cents() as i128;
            let percent = (200 * a + p) / (2 * p);

            u32::try_from(percent).map_err(|_| CoreError::InvalidDiscountAmount {
                reason: format!("{} is out of range for a percentage", percent),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(p: u32) -> Discount {
        Discount::Percent(DiscountRate::from_percent(p))
    }

    fn fixed(cents: i64) -> Discount {
        Discount::Fixed(Money::from_cents(cents))
    }

    fn line(unit_cents: i64, qty: i64, discount: Discount) -> LineItem {
        LineItem::new(Money::from_cents(unit_cents), qty, discount)
    }

    #[test]
    fn test_percent_example() {
        // 100 × 3 at 20% → 80 / 300 / 240 / 60
        let unit = Money::from_major_minor(100, 0);
        assert_eq!(
            discounted_unit_price(unit, &percent(20)).unwrap(),
            Money::from_major_minor(80, 0)
        );

        let amounts = line_amounts(unit, 3, &percent(20)).unwrap();
        assert_eq!(amounts.subtotal, Money::from_major_minor(300, 0));
        assert_eq!(amounts.total, Money::from_major_minor(240, 0));
        assert_eq!(amounts.discount().unwrap(), Money::from_major_minor(60, 0));
    }

    #[test]
    fn test_fixed_example() {
        // 50 × 2 with 10 off → 40 / 100 / 80 / 20
        let unit = Money::from_major_minor(50, 0);
        let ten = fixed(1000);
        assert_eq!(
            discounted_unit_price(unit, &ten).unwrap(),
            Money::from_major_minor(40, 0)
        );

        let amounts = line_amounts(unit, 2, &ten).unwrap();
        assert_eq!(amounts.subtotal.cents(), 10000);
        assert_eq!(amounts.total.cents(), 8000);
        assert_eq!(amounts.discount().unwrap().cents(), 2000);
    }

    #[test]
    fn test_cart_summary_example() {
        let lines = [line(10000, 3, percent(20)), line(5000, 2, fixed(1000))];
        let summary = cart_summary(&lines).unwrap();

        assert_eq!(summary.subtotal.cents(), 40000);
        assert_eq!(summary.discount.cents(), 8000);
        assert_eq!(summary.total.cents(), 32000);
        assert_eq!(summary.item_count, 2);
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = cart_summary(&[]).unwrap();
        assert!(summary.is_empty());
        assert!(summary.total.is_zero());
    }

    #[test]
    fn test_cart_summary_is_order_independent() {
        let a = line(1999, 3, percent(15));
        let b = line(4550, 1, fixed(500));
        let c = line(999, 7, Discount::none());

        let expected = cart_summary(&[a, b, c]).unwrap();
        for perm in [[a, c, b], [b, a, c], [b, c, a], [c, a, b], [c, b, a]] {
            assert_eq!(cart_summary(&perm).unwrap(), expected);
        }
    }

    #[test]
    fn test_summary_discount_is_exact() {
        // Prices that drift in floating point
        let lines = [
            line(1999, 3, percent(33)),
            line(333, 9, percent(17)),
            line(10, 11, fixed(3)),
        ];
        let summary = cart_summary(&lines).unwrap();
        assert_eq!(summary.subtotal - summary.discount, summary.total);

        let per_line = lines
            .iter()
            .map(|l| PricingRules::default().amounts_for(l).unwrap().discount().unwrap())
            .fold(Money::zero(), |acc, d| acc + d);
        assert_eq!(per_line, summary.discount);
    }

    #[test]
    fn test_subtotal_uses_undiscounted_price() {
        for qty in 1..=20 {
            let amounts = line_amounts(Money::from_cents(1234), qty, &percent(50)).unwrap();
            assert_eq!(amounts.subtotal.cents(), 1234 * qty);
        }
    }

    #[test]
    fn test_percent_is_monotonic() {
        let unit = Money::from_cents(4999);
        let mut previous = unit;
        for d in 0..=100 {
            let price = discounted_unit_price(unit, &percent(d)).unwrap();
            assert!(price <= previous, "{}% raised the price", d);
            previous = price;
        }
        assert_eq!(previous, Money::zero());
    }

    #[test]
    fn test_percent_rounds_unit_price_to_cent() {
        // 15% of $0.99 = 14.85 cents → 15 off → 84
        let price = discounted_unit_price(Money::from_cents(99), &percent(15)).unwrap();
        assert_eq!(price.cents(), 84);
    }

    #[test]
    fn test_fixed_discount_exceeding_price_clamps_by_default() {
        let amounts = line_amounts(Money::from_cents(500), 2, &fixed(800)).unwrap();
        assert_eq!(amounts.total, Money::zero());
        assert_eq!(amounts.discount().unwrap().cents(), 1000);
    }

    #[test]
    fn test_fixed_discount_passthrough() {
        let rules = PricingRules {
            negative_price: NegativePricePolicy::Passthrough,
            ..PricingRules::default()
        };
        let price = rules
            .discounted_unit_price(Money::from_cents(500), &fixed(800))
            .unwrap();
        assert_eq!(price.cents(), -300);
    }

    fn passthrough() -> PricingRules {
        PricingRules {
            negative_price: NegativePricePolicy::Passthrough,
            ..PricingRules::default()
        }
    }

    #[test]
    fn test_passthrough_line_amounts() {
        // 5.00 × 2 with 8.00 off each → total −6.00, discount 16.00
        let amounts = passthrough()
            .line_amounts(Money::from_cents(500), 2, &fixed(800))
            .unwrap();
        assert_eq!(amounts.subtotal.cents(), 1000);
        assert_eq!(amounts.total.cents(), -600);
        assert_eq!(amounts.discount().unwrap().cents(), 1600);
        assert_eq!(amounts.subtotal - amounts.discount().unwrap(), amounts.total);
    }

    #[test]
    fn test_passthrough_cart_summary() {
        let lines = [line(500, 2, fixed(800)), line(1000, 1, percent(10))];
        let summary = passthrough().cart_summary(&lines).unwrap();

        assert_eq!(summary.subtotal.cents(), 2000);
        assert_eq!(summary.total.cents(), 300);
        assert_eq!(summary.discount.cents(), 1700);
        assert_eq!(summary.subtotal - summary.discount, summary.total);

        // Negative aggregate: discount exceeds subtotal
        let lines = [line(100, 3, fixed(1000))];
        let summary = passthrough().cart_summary(&lines).unwrap();
        assert_eq!(summary.total.cents(), -2700);
        assert!(summary.discount > summary.subtotal);
        assert_eq!(summary.subtotal - summary.discount, summary.total);

        // Same cart clamps under the default rules
        assert_eq!(cart_summary(&lines).unwrap().total, Money::zero());
    }

    #[test]
    fn test_line_amounts_overflow() {
        // Fits in cents, overflows once multiplied by the quantity
        assert_eq!(
            line_amounts(Money::from_cents(5_000_000_000_000_000_000), 2, &Discount::none()),
            Err(CoreError::AmountOverflow)
        );
        // Total fits, but subtotal − total (2 × the fixed amount) doesn't
        assert_eq!(
            passthrough().line_amounts(Money::from_cents(1000), 2, &fixed(i64::MAX / 2 + 10)),
            Err(CoreError::AmountOverflow)
        );
    }

    #[test]
    fn test_cart_summary_overflow() {
        let big = line(i64::MAX / 999, 999, Discount::none());
        assert!(line_amounts(big.unit_price, big.quantity, &big.discount).is_ok());
        assert_eq!(cart_summary(&[big, big]), Err(CoreError::AmountOverflow));
    }

    #[test]
    fn test_invalid_price() {
        assert_eq!(
            discounted_unit_price(Money::zero(), &percent(10)),
            Err(CoreError::InvalidPrice { cents: 0 })
        );
        assert_eq!(
            line_amounts(Money::from_cents(-1), 1, &Discount::none()),
            Err(CoreError::InvalidPrice { cents: -1 })
        );
    }

    #[test]
    fn test_invalid_quantity() {
        assert_eq!(
            line_amounts(Money::from_cents(100), 0, &Discount::none()),
            Err(CoreError::InvalidQuantity(0))
        );
        assert_eq!(
            line_amounts(Money::from_cents(100), 1000, &Discount::none()),
            Err(CoreError::QuantityTooLarge {
                requested: 1000,
                max: MAX_ITEM_QUANTITY
            })
        );
    }

    #[test]
    fn test_invalid_discount_amounts() {
        assert!(matches!(
            discounted_unit_price(Money::from_cents(100), &fixed(-1)),
            Err(CoreError::InvalidDiscountAmount { .. })
        ));
        assert!(matches!(
            discounted_unit_price(
                Money::from_cents(100),
                &Discount::Percent(DiscountRate::from_bps(10001))
            ),
            Err(CoreError::InvalidDiscountAmount { .. })
        ));
    }

    #[test]
    fn test_cart_summary_rejects_bad_line() {
        let lines = [line(100, 1, Discount::none()), line(100, 0, Discount::none())];
        assert_eq!(cart_summary(&lines), Err(CoreError::InvalidQuantity(0)));
    }

    #[test]
    fn test_percentage_equivalent() {
        assert_eq!(percentage_equivalent(&percent(20), Money::from_cents(100)).unwrap(), 20);
        assert_eq!(
            percentage_equivalent(&Discount::Percent(DiscountRate::from_bps(1250)), Money::zero())
                .unwrap(),
            13
        );
        // 10 of 50 → 20%
        assert_eq!(percentage_equivalent(&fixed(1000), Money::from_cents(5000)).unwrap(), 20);
        // 1 of 8 = 12.5% → 13
        assert_eq!(percentage_equivalent(&fixed(100), Money::from_cents(800)).unwrap(), 13);
        assert_eq!(
            percentage_equivalent(&fixed(100), Money::zero()),
            Err(CoreError::DivisionUndefined)
        );
        assert!(percentage_equivalent(&fixed(100), Money::from_cents(-5)).is_err());
    }

    #[test]
    fn test_percentage_equivalent_rejects_rate_above_100() {
        for bps in [10001, u32::MAX] {
            assert!(matches!(
                percentage_equivalent(
                    &Discount::Percent(DiscountRate::from_bps(bps)),
                    Money::from_cents(100)
                ),
                Err(CoreError::InvalidDiscountAmount { .. })
            ));
        }
        assert_eq!(
            percentage_equivalent(&Discount::Percent(DiscountRate::from_bps(10000)), Money::zero()),
            Ok(100)
        );
    }

    #[test]
    fn test_operations_are_idempotent() {
        let item = line(2599, 4, percent(35));
        let rules = PricingRules::default();
        assert_eq!(rules.amounts_for(&item), rules.amounts_for(&item));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("clamp".parse::<NegativePricePolicy>().unwrap(), NegativePricePolicy::Clamp);
        assert_eq!(
            "PASSTHROUGH".parse::<NegativePricePolicy>().unwrap(),
            NegativePricePolicy::Passthrough
        );
        assert!("zero".parse::<NegativePricePolicy>().is_err());
        assert_eq!(NegativePricePolicy::Passthrough.to_string(), "passthrough");
    }
}
