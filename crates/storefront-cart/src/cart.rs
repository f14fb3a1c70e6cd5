//! # Cart State
//!
//! The client-side view of the server cart.
//!
//! The backend owns the cart; this module holds the last listing, checks
//! stock before a change is sent, and prices every change through
//! storefront-core so the cart, checkout and detail screens agree.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Shell Action            Cart Method             Result                 │
//! │  ────────────            ───────────             ──────                 │
//! │                                                                         │
//! │  Open cart ─────────────► replace() ────────────► lines = listing      │
//! │                                                                         │
//! │  Quantity stepper ──────► change_quantity() ────► CartLineUpdate       │
//! │                                                                         │
//! │  Add to cart ───────────► add_product() ────────► NewCartLine          │
//! │                                                                         │
//! │  Remove ────────────────► remove_line() ────────► line removed         │
//! │                                                                         │
//! │  Cart / checkout ───────► summary() ────────────► CartSummary          │
//! │                                                                         │
//! │  NOTE: CartState wraps the cart in a Mutex; every operation holds      │
//! │        the lock only for the duration of the closure.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::validation::{check_stock, validate_cart_size};
use storefront_core::{
    CartSummary, CoreError, Discount, InventoryKind, LineAmounts, LineItem, Money, PricingRules,
    Product, Variety, MAX_CART_LINES,
};
use tracing::{debug, warn};

use crate::error::{CartError, CartResult};
use crate::listing::{CartLineUpdate, NewCartLine};

// =============================================================================
// Policy
// =============================================================================

/// Rules the cart enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartPolicy {
    pub pricing: PricingRules,
    /// Largest number of lines (capped at 100).
    pub max_lines: usize,
}

impl Default for CartPolicy {
    fn default() -> Self {
        CartPolicy {
            pricing: PricingRules::default(),
            max_lines: MAX_CART_LINES,
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// The product fields a cart line carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: String,
    pub title: String,
    pub sku: String,
    /// Product-level stock at listing time.
    pub stock: i64,
    pub inventory: InventoryKind,
}

/// The variety on a cart line.
///
/// The listing sometimes returns only the variety id; its stock is then
/// unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarietyRef {
    Populated(Variety),
    Id(String),
}

impl VarietyRef {
    pub fn id(&self) -> &str {
        match self {
            VarietyRef::Populated(variety) => &variety.id,
            VarietyRef::Id(id) => id,
        }
    }

    pub fn stock(&self) -> Option<i64> {
        match self {
            VarietyRef::Populated(variety) => Some(variety.stock),
            VarietyRef::Id(_) => None,
        }
    }
}

/// One line of the server cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Backend id of the line.
    pub id: String,
    pub product: ProductRef,
    pub variety: Option<VarietyRef>,
    /// Undiscounted unit price.
    pub unit_price: Money,
    pub quantity: i64,
    pub discount: Discount,
    pub coupon_code: Option<String>,
    pub discount_code: Option<String>,
    /// Subtotal and total as last stored by the backend.
    pub server_amounts: LineAmounts,
}

impl CartLine {
    /// The calculator's view of this line.
    #[inline]
    pub fn as_line_item(&self) -> LineItem {
        LineItem::new(self.unit_price, self.quantity, self.discount)
    }

    /// Stock available for this line.
    ///
    /// ## Rules
    /// ```text
    /// inventory = Variant AND variety present
    ///     populated → variety stock
    ///     id only   → 0 (unknown, nothing can be added)
    /// otherwise     → product stock
    /// ```
    pub fn available_stock(&self) -> i64 {
        match (self.product.inventory, &self.variety) {
            (InventoryKind::Variant, Some(variety)) => variety.stock().unwrap_or(0),
            _ => self.product.stock,
        }
    }

    /// Checks if this line holds the given product and variety.
    ///
    /// Without a variety, only lines that have no variety match.
    pub fn matches(&self, product_id: &str, variety_id: Option<&str>) -> bool {
        if self.product.id != product_id {
            return false;
        }

        match variety_id {
            Some(wanted) => self.variety.as_ref().map(VarietyRef::id) == Some(wanted),
            None => self.variety.is_none(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart as last listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
    /// When the lines were last replaced from a listing.
    pub loaded_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Replaces all lines with a fresh listing.
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
        self.loaded_at = Utc::now();
    }

    /// Finds the line holding a product (and variety).
    pub fn find_line(&self, product_id: &str, variety_id: Option<&str>) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.matches(product_id, variety_id))
    }

    /// Looks up a line by its backend id.
    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    /// Changes the quantity of a line.
    ///
    /// ## Flow
    /// 1. quantity < 1 → `InvalidQuantity`
    /// 2. stock check against [`CartLine::available_stock`]
    /// 3. price the line at the new quantity
    /// 4. apply locally and return the payload for the backend
    pub fn change_quantity(
        &mut self,
        line_id: &str,
        quantity: i64,
        policy: &CartPolicy,
    ) -> CartResult<CartLineUpdate> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity(quantity).into());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;

        let available = line.available_stock();
        if let Err(e) = check_stock(available, quantity) {
            debug!(line_id, available, requested = quantity, "Quantity change rejected");
            return Err(e.into());
        }

        let amounts = policy
            .pricing
            .line_amounts(line.unit_price, quantity, &line.discount)?;

        line.quantity = quantity;
        line.server_amounts = amounts;

        let (type_discount, discount) = line.discount.to_wire();
        Ok(CartLineUpdate {
            line_id: line.id.clone(),
            product_id: line.product.id.clone(),
            quantity,
            type_discount,
            discount,
            coupon_code: line.coupon_code.clone(),
            code_discount: line.discount_code.clone(),
            unit_price: line.unit_price.to_decimal(),
            subtotal: amounts.subtotal.to_decimal(),
            total: amounts.total.to_decimal(),
            variety_id: line.variety.as_ref().map(|v| v.id().to_string()),
        })
    }

    /// Builds the add-to-cart payload for a product.
    ///
    /// The cart itself is unchanged; the backend assigns the line id and
    /// the next listing brings the line in.
    ///
    /// ## Errors
    /// - `VarietyRequired` when stock is per variety and none is selected
    /// - `OutOfStock` / `InsufficientStock`
    /// - `AlreadyInCart` when the product and variety already have a line
    /// - cart size and pricing errors
    pub fn add_product(
        &self,
        product: &Product,
        variety_id: Option<&str>,
        quantity: i64,
        policy: &CartPolicy,
    ) -> CartResult<NewCartLine> {
        if product.inventory == InventoryKind::Variant && variety_id.is_none() {
            return Err(CoreError::VarietyRequired.into());
        }

        let available = product.available_stock(variety_id)?;
        check_stock(available, quantity)?;

        if self.find_line(&product.id, variety_id).is_some() {
            return Err(CartError::AlreadyInCart {
                product_id: product.id.clone(),
            });
        }

        validate_cart_size(self.lines.len(), policy.max_lines)?;

        let discount = product.effective_discount();
        let amounts = policy
            .pricing
            .line_amounts(product.price, quantity, &discount)?;

        let (type_discount, discount_amount) = discount.to_wire();
        Ok(NewCartLine {
            product_id: product.id.clone(),
            type_discount,
            discount: discount_amount,
            quantity,
            variety_id: variety_id.map(str::to_string),
            coupon_code: None,
            code_discount: product.active_campaign().map(|c| c.id.clone()),
            unit_price: product.price.to_decimal(),
            subtotal: amounts.subtotal.to_decimal(),
            total: amounts.total.to_decimal(),
        })
    }

    /// Removes a line by id.
    pub fn remove_line(&mut self, line_id: &str) -> CartResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| line.id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;

        Ok(self.lines.remove(index))
    }

    /// Clears all lines (after a successful checkout).
    pub fn clear(&mut self) {
        self.lines.clear();
        self.loaded_at = Utc::now();
    }

    /// Number of lines (the tab badge count).
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Checks if the cart is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Prices every line and summarises the cart.
    pub fn summary(&self, rules: &PricingRules) -> CartResult<CartSummary> {
        let items: Vec<LineItem> = self.lines.iter().map(CartLine::as_line_item).collect();
        let summary = rules.cart_summary(&items)?;

        match self.server_summary() {
            Ok(server) if server.total != summary.total => warn!(
                local = %summary.total,
                server = %server.total,
                "Cart total differs from backend amounts"
            ),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Backend cart amounts cannot be summed"),
        }

        Ok(summary)
    }

    /// Summary of the amounts the backend stored, without repricing.
    pub fn server_summary(&self) -> CartResult<CartSummary> {
        CartSummary::from_amounts(self.lines.iter().map(|line| line.server_amounts))
            .map_err(CartError::from)
    }
}

// =============================================================================
// Shared State
// =============================================================================

/// Shared cart handle for the shell.
///
/// ## Thread Safety
/// `Arc<Mutex<Cart>>`: the shell may call in from several callbacks, and
/// only one may modify the cart at a time. A poisoned lock is recovered,
/// since every `Cart` method leaves the cart consistent before it can
/// fail.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Replaces the cart with a fresh listing and returns the line count.
    pub fn replace(&self, lines: Vec<CartLine>) -> usize {
        self.with_cart_mut(|cart| {
            cart.replace(lines);
            cart.line_count()
        })
    }

    /// Number of lines, for the badge.
    pub fn line_count(&self) -> usize {
        self.with_cart(Cart::line_count)
    }
}
