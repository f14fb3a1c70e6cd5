//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Pricing and stock rule failures                │
//! │  └── ValidationError  - Input field validation failures                │
//! │                                                                         │
//! │  storefront-cart errors (separate crate)                               │
//! │  └── CartError        - Wire, config and cart state failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → toast in the shell    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure here is local and recoverable. The usual recovery is to
//! price the line without a discount, or to reject the line before it is
//! priced at all.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing and stock rule errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Discount kind code is neither percent (1) nor fixed (2).
    ///
    /// Callers treat the unit price as undiscounted.
    #[error("Invalid discount kind: {0}")]
    InvalidDiscountKind(i64),

    /// Discount amount is negative, not a number, or above 100%.
    #[error("Invalid discount amount: {reason}")]
    InvalidDiscountAmount { reason: String },

    /// Unit price is zero or negative.
    #[error("Invalid unit price: {cents} cents")]
    InvalidPrice { cents: i64 },

    /// Quantity is below 1.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds the configured maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An amount left the representable cent range (price × quantity or
    /// a cart total).
    #[error("Amount is out of range")]
    AmountOverflow,

    /// Percentage of a fixed discount over a zero price.
    #[error("Percentage is undefined for a zero unit price")]
    DivisionUndefined,

    /// Nothing left to sell.
    #[error("Out of stock")]
    OutOfStock,

    /// Insufficient stock to satisfy the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Quantity stepper (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Toast: "Only 3 units available"
    /// ```
    #[error("Only {available} units available, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// Product tracks stock per variety and the variety is unknown.
    #[error("Variety not found: {0}")]
    VarietyNotFound(String),

    /// Product tracks stock per variety and none was selected.
    #[error("A variety must be selected")]
    VarietyRequired,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a malformed coupon code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
