//! # Domain Types
//!
//! Core domain types shared by the pricing calculator and the cart layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    LineItem     │   │  CartSummary    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  price (Money)  │──►│  unit_price     │──►│  subtotal       │       │
//! │  │  stock          │   │  quantity       │   │  discount       │       │
//! │  │  inventory      │   │  discount       │   │  total          │       │
//! │  │  campaign ──┐   │   └─────────────────┘   │  item_count     │       │
//! │  └─────────────┼───┘                         └─────────────────┘       │
//! │                ▼                                                        │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │CampaignDiscount │   │    Discount     │   │  DiscountKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  discount ──────┼──►│  Percent(rate)  │   │  Percent = 1    │       │
//! │  │  starts/ends_at │   │  Fixed(Money)   │   │  Fixed   = 2    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;
use crate::validation::{validate_discount_rate_bps, validate_fixed_discount};

// =============================================================================
// Discount Kind
// =============================================================================

/// How a discount amount is interpreted.
///
/// The numeric codes are the ones the backend stores in `type_discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DiscountKind {
    /// Percentage of the unit price.
    Percent = 1,
    /// Flat amount subtracted from the unit price.
    Fixed = 2,
}

impl DiscountKind {
    /// Returns the backend code for this kind.
    #[inline]
    pub const fn code(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<i64> for DiscountKind {
    type Error = CoreError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(DiscountKind::Percent),
            2 => Ok(DiscountKind::Fixed),
            other => Err(CoreError::InvalidDiscountKind(other)),
        }
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Percent discount in basis points.
///
/// 1 basis point = 0.01%, so 2000 bps = 20% and 1250 bps = 12.5%.
/// Keeping the rate integral lets fractional percentages from the backend
/// survive without floating point in the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage.
    ///
    /// Saturates instead of overflowing; an out-of-range rate is rejected
    /// when it is priced.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent.saturating_mul(100))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for the outgoing wire format).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount terms attached to a line or a campaign.
///
/// ## Example
/// ```rust
/// use storefront_core::types::{Discount, DiscountKind};
/// use storefront_core::Money;
///
/// let discount = Discount::from_wire(2, 10.0).unwrap();
/// assert_eq!(discount, Discount::Fixed(Money::from_cents(1000)));
/// assert_eq!(discount.kind(), DiscountKind::Fixed);
///
/// assert!(Discount::from_wire(3, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage off the unit price.
    Percent(DiscountRate),
    /// Flat amount off the unit price.
    Fixed(Money),
}

impl Discount {
    /// No discount at all.
    #[inline]
    pub const fn none() -> Self {
        Discount::Percent(DiscountRate::zero())
    }

    /// Builds a discount from the backend's `(type_discount, discount)` pair.
    ///
    /// ## Rules
    /// - kind must be 1 (percent) or 2 (fixed); the backend field is an
    ///   unconstrained integer, so any other value is `InvalidDiscountKind`
    /// - amount must be finite and non-negative
    /// - a percent amount must not exceed 100
    pub fn from_wire(kind_code: i64, amount: f64) -> CoreResult<Self> {
        let kind = DiscountKind::try_from(kind_code)?;

        if !amount.is_finite() {
            return Err(CoreError::InvalidDiscountAmount {
                reason: "amount is not a number".to_string(),
            });
        }
        if amount < 0.0 {
            return Err(CoreError::InvalidDiscountAmount {
                reason: format!("amount {} is negative", amount),
            });
        }

        match kind {
            DiscountKind::Percent => {
                let bps = (amount * 100.0).round();
                if bps > u32::MAX as f64 {
                    return Err(CoreError::InvalidDiscountAmount {
                        reason: format!("percentage {} is out of range", amount),
                    });
                }
                let bps = bps as u32;
                validate_discount_rate_bps(bps)?;
                Ok(Discount::Percent(DiscountRate::from_bps(bps)))
            }
            DiscountKind::Fixed => {
                let money = Money::from_decimal(amount).ok_or_else(|| {
                    CoreError::InvalidDiscountAmount {
                        reason: format!("amount {} is out of range", amount),
                    }
                })?;
                validate_fixed_discount(money)?;
                Ok(Discount::Fixed(money))
            }
        }
    }

    /// Returns the `(type_discount, discount)` pair for outgoing payloads.
    pub fn to_wire(&self) -> (u8, f64) {
        match self {
            Discount::Percent(rate) => (DiscountKind::Percent.code(), rate.percentage()),
            Discount::Fixed(amount) => (DiscountKind::Fixed.code(), amount.to_decimal()),
        }
    }

    /// Returns the kind of this discount.
    #[inline]
    pub const fn kind(&self) -> DiscountKind {
        match self {
            Discount::Percent(_) => DiscountKind::Percent,
            Discount::Fixed(_) => DiscountKind::Fixed,
        }
    }

    /// Checks if this discount takes nothing off.
    pub fn is_none(&self) -> bool {
        match self {
            Discount::Percent(rate) => rate.bps() == 0,
            Discount::Fixed(amount) => amount.is_zero(),
        }
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One cart or order entry, reduced to the fields the calculator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// List price of one unit, before any discount.
    pub unit_price: Money,
    /// Units in the line (at least 1).
    pub quantity: i64,
    /// Discount terms for the line.
    pub discount: Discount,
}

impl LineItem {
    pub fn new(unit_price: Money, quantity: i64, discount: Discount) -> Self {
        LineItem {
            unit_price,
            quantity,
            discount,
        }
    }
}

// =============================================================================
// Line Amounts
// =============================================================================

/// Subtotal and total of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineAmounts {
    /// Undiscounted unit price × quantity.
    pub subtotal: Money,
    /// Discounted unit price × quantity.
    pub total: Money,
}

impl LineAmounts {
    /// The amount the discount takes off this line.
    ///
    /// Fails with `AmountOverflow` when `subtotal − total` leaves the cent
    /// range, which only happens for amounts the calculator did not build.
    #[inline]
    pub fn discount(&self) -> CoreResult<Money> {
        self.subtotal
            .checked_sub(self.total)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Aggregate totals shown on the cart and checkout screens.
///
/// Always satisfies `total = subtotal - discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    /// Number of lines (not units) in the cart.
    pub item_count: usize,
}

impl CartSummary {
    /// Summarises line amounts that are already known.
    ///
    /// Sums are checked; a cart whose totals leave the cent range fails
    /// with `AmountOverflow`.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::types::{CartSummary, LineAmounts};
    /// use storefront_core::Money;
    ///
    /// let summary = CartSummary::from_amounts([
    ///     LineAmounts { subtotal: Money::from_cents(30000), total: Money::from_cents(24000) },
    ///     LineAmounts { subtotal: Money::from_cents(10000), total: Money::from_cents(8000) },
    /// ]).unwrap();
    /// assert_eq!(summary.subtotal.cents(), 40000);
    /// assert_eq!(summary.discount.cents(), 8000);
    /// assert_eq!(summary.total.cents(), 32000);
    /// assert_eq!(summary.item_count, 2);
    /// ```
    pub fn from_amounts<I>(amounts: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = LineAmounts>,
    {
        let mut summary = CartSummary::default();
        for line in amounts {
            summary.subtotal = summary
                .subtotal
                .checked_add(line.subtotal)
                .ok_or(CoreError::AmountOverflow)?;
            summary.total = summary
                .total
                .checked_add(line.total)
                .ok_or(CoreError::AmountOverflow)?;
            summary.item_count += 1;
        }
        summary.discount = LineAmounts {
            subtotal: summary.subtotal,
            total: summary.total,
        }
        .discount()?;
        Ok(summary)
    }

    /// Checks if the summary covers no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Where a product's stock is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    /// A single stock figure on the product.
    #[default]
    Simple,
    /// Stock tracked per variety (size, color, ...).
    Variant,
}

impl InventoryKind {
    /// Maps the backend's `type_inventario` code.
    ///
    /// Only 2 means per-variety stock; anything else reads the product
    /// stock.
    pub const fn from_code(code: i64) -> Self {
        match code {
            2 => InventoryKind::Variant,
            _ => InventoryKind::Simple,
        }
    }
}

/// A selectable variety of a product, with its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Variety {
    pub id: String,
    /// Display value ("XL", "Red").
    pub value: String,
    pub stock: i64,
}

// =============================================================================
// Campaign Discount
// =============================================================================

/// A time-boxed discount the backend attaches to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CampaignDiscount {
    pub id: String,
    /// Campaign type code as stored by the backend.
    pub campaign_kind: i64,
    pub discount: Discount,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub ends_at: DateTime<Utc>,
}

impl CampaignDiscount {
    /// Checks if the campaign window contains `now` (inclusive).
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as shown on the card and detail screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub sku: String,
    /// List price, before any campaign discount.
    pub price: Money,
    /// Product-level stock (used unless inventory is per variety).
    pub stock: i64,
    pub inventory: InventoryKind,
    #[serde(default)]
    pub varieties: Vec<Variety>,
    #[serde(default)]
    pub campaign_discount: Option<CampaignDiscount>,
}

impl Product {
    /// Returns the attached campaign if its window contains `now`.
    pub fn active_campaign_at(&self, now: DateTime<Utc>) -> Option<&CampaignDiscount> {
        self.campaign_discount
            .as_ref()
            .filter(|campaign| campaign.is_active_at(now))
    }

    /// Returns the attached campaign if it is running right now.
    #[inline]
    pub fn active_campaign(&self) -> Option<&CampaignDiscount> {
        self.active_campaign_at(Utc::now())
    }

    /// Returns the running campaign's discount, or no discount.
    ///
    /// A campaign outside its window prices the product at list price.
    pub fn effective_discount(&self) -> Discount {
        self.active_campaign()
            .map(|campaign| campaign.discount)
            .unwrap_or_default()
    }

    /// Checks if a running campaign discounts this product.
    #[inline]
    pub fn has_discount(&self) -> bool {
        self.active_campaign().is_some()
    }

    /// Unit price after the running campaign's discount.
    ///
    /// Without a campaign this is the list price. This is the price the
    /// product card and detail screen show.
    ///
    /// ## Errors
    /// - `InvalidPrice` if the list price is zero or negative
    pub fn sale_price(&self) -> CoreResult<Money> {
        pricing::discounted_unit_price(self.price, &self.effective_discount())
    }

    /// The running campaign's discount as a whole percentage, for the
    /// "-20%" badge. 0 without a campaign.
    ///
    /// ## Errors
    /// - `DivisionUndefined` for a fixed campaign discount on a zero price
    pub fn percent_off(&self) -> CoreResult<u32> {
        match self.active_campaign() {
            Some(campaign) => pricing::percentage_equivalent(&campaign.discount, self.price),
            None => Ok(0),
        }
    }

    /// Looks up a variety by id.
    pub fn variety(&self, variety_id: &str) -> Option<&Variety> {
        self.varieties.iter().find(|v| v.id == variety_id)
    }

    /// Returns the stock available for the given selection.
    ///
    /// ## Rules
    /// ```text
    /// inventory = Variant AND variety selected → that variety's stock
    /// otherwise                               → product stock
    /// ```
    ///
    /// A selected variety that the product doesn't list is an error
    /// rather than silently falling back to the product stock.
    pub fn available_stock(&self, variety_id: Option<&str>) -> CoreResult<i64> {
        match (self.inventory, variety_id) {
            (InventoryKind::Variant, Some(id)) => self
                .variety(id)
                .map(|v| v.stock)
                .ok_or_else(|| CoreError::VarietyNotFound(id.to_string())),
            _ => Ok(self.stock),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
