//! # Checkout Totals
//!
//! The amounts the checkout screen shows and hands to the payment widget.

use serde::{Deserialize, Serialize};
use storefront_core::{CartSummary, PricingRules};
use tracing::info;

use crate::cart::Cart;
use crate::error::{CartError, CartResult};

/// Priced totals for a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub summary: CartSummary,
    /// ISO 4217 code passed to the payment widget.
    pub currency: String,
}

impl CheckoutTotals {
    /// Prices the cart for checkout.
    ///
    /// ## Errors
    /// - `EmptyCart` when there is nothing to pay for
    /// - any pricing error from the cart lines
    pub fn from_cart(cart: &Cart, rules: &PricingRules, currency: &str) -> CartResult<Self> {
        if cart.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let summary = cart.summary(rules)?;

        info!(
            lines = summary.item_count,
            total = %summary.total,
            currency,
            "Checkout totals computed"
        );

        Ok(CheckoutTotals {
            summary,
            currency: currency.to_string(),
        })
    }

    /// Amount to charge, as a two-decimal string (e.g. `"320.00"`).
    pub fn payment_amount(&self) -> String {
        self.summary.total.amount_string()
    }
}
