//! # storefront-core: Pure Pricing Logic for the Storefront Client
//!
//! This crate holds the only real arithmetic in the storefront: discounted
//! unit prices, line totals, the cart summary and the "percent off" badge.
//! The cart, checkout and product-detail screens all call into it instead
//! of recomputing prices on their own.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile Shell (web components)                │   │
//! │  │   Product Card ──► Product Detail ──► Cart ──► Checkout         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-cart (state + wire)                  │   │
//! │  │    cart listing codec, stock checks, update payloads            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ LineAmts  │  │   rules   │  │   │
//! │  │   │ Discount  │  │           │  │ Summary   │  │   stock   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO STORAGE • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Discount, LineItem, Product, CartSummary)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - The pricing/discount calculator
//! - [`error`] - Domain error types
//! - [`validation`] - Field and stock validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::pricing::line_amounts;
//! use storefront_core::types::{Discount, DiscountRate};
//!
//! let unit = Money::from_major_minor(100, 0);
//! let discount = Discount::Percent(DiscountRate::from_percent(20));
//!
//! let amounts = line_amounts(unit, 3, &discount).unwrap();
//! assert_eq!(amounts.subtotal, Money::from_major_minor(300, 0));
//! assert_eq!(amounts.total, Money::from_major_minor(240, 0));
//! assert_eq!(amounts.discount().unwrap(), Money::from_major_minor(60, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{NegativePricePolicy, PricingRules};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against typing 1000 instead of 10 in the quantity stepper.
pub const MAX_ITEM_QUANTITY: i64 = 999;
