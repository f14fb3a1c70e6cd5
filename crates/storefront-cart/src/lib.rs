//! # storefront-cart: Client Cart Layer for the Storefront
//!
//! This crate sits between the mobile shell and storefront-core. It turns
//! backend JSON into priced domain values, enforces stock rules before a
//! change goes out, and builds the payloads the shell posts back.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Layer Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 Mobile Shell (HTTP + UI)                         │  │
//! │  └──────────┬───────────────────────┬───────────────────────┬───────┘  │
//! │             │ JSON bodies           │ user actions          │ startup  │
//! │             ▼                       ▼                       ▼          │
//! │  ┌────────────────┐  ┌──────────────────────┐  ┌────────────────────┐  │
//! │  │    listing     │  │   cart / checkout    │  │  config / logging  │  │
//! │  │                │  │                      │  │                    │  │
//! │  │ decode listing │─►│ CartState (Mutex)    │  │ TOML + env         │  │
//! │  │ decode product │  │ stock checks         │  │ tracing subscriber │  │
//! │  │ encode payload │◄─│ CheckoutTotals       │  │                    │  │
//! │  └────────────────┘  └──────────┬───────────┘  └────────────────────┘  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                   storefront-core (pricing, pure)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`cart`] - Cart lines, stock rules, shared `CartState`
//! - [`checkout`] - Totals and payment amount
//! - [`config`] - Configuration file and environment overrides
//! - [`error`] - Cart error types
//! - [`listing`] - Backend JSON codec
//! - [`logging`] - Tracing subscriber bootstrap
//!
//! ## Example
//! ```rust
//! use storefront_cart::{listing::parse_cart_listing, CheckoutTotals};
//! use storefront_core::PricingRules;
//!
//! let body = r#"{ "carts": [{
//!     "_id": "l1", "product": { "_id": "p1", "price_usd": 100, "stock": 10 },
//!     "type_discount": 1, "discount": 20, "cantidad": 3,
//!     "price_unitario": 100, "subtotal": 300, "total": 240
//! }]}"#;
//!
//! let rules = PricingRules::default();
//! let state = storefront_cart::CartState::new();
//! state.replace(parse_cart_listing(body, &rules).unwrap());
//!
//! let totals = state
//!     .with_cart(|cart| CheckoutTotals::from_cart(cart, &rules, "USD"))
//!     .unwrap();
//! assert_eq!(totals.payment_amount(), "240.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::{Cart, CartLine, CartPolicy, CartState, ProductRef, VarietyRef};
pub use checkout::CheckoutTotals;
pub use config::StorefrontConfig;
pub use error::{CartError, CartResult};
pub use listing::{CartLineUpdate, CouponRequest, NewCartLine};
pub use logging::init_tracing;
