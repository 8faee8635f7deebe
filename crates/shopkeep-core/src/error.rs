//! # Error Types
//!
//! Domain-specific error types for shopkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Error Hierarchy                                │
//! │                                                                         │
//! │  CoreError (business rules)                                            │
//! │  ├── EmptySale              "No items in sale"                         │
//! │  ├── ProductNotFound(id)    "Product {id} not found"                   │
//! │  ├── InsufficientStock      "Insufficient stock for {name}"            │
//! │  └── Validation(ValidationError)                                       │
//! │                                                                         │
//! │  ValidationError (input shape)                                         │
//! │  ├── Required, InvalidFormat, MustBePositive                           │
//! │  └── OutOfRange, TooLong, TooManyDecimals                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Display` text of the sale errors is exactly what API clients see in
//! the `error` field of the response body.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A sale was requested with no line items.
    #[error("No items in sale")]
    EmptySale,

    /// A sale line references a product that does not exist.
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    /// Not enough stock on hand to cover a sale line.
    ///
    /// `requested` is cumulative: when the same product appears on several
    /// lines, it is the total asked for up to and including the failing line.
    #[error("Insufficient stock for {name}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while coercing request bodies into domain input, before any
/// business logic runs.
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

    /// Value has the wrong type or cannot be parsed.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Decimal value has more fractional digits than the currency allows.
    #[error("{field} must have at most {max} decimal places")]
    TooManyDecimals { field: String, max: u32 },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error for a field.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
