//! # shopkeep-core: Pure Business Logic for Shopkeep
//!
//! This crate contains the domain of the shop: money, catalog and ledger
//! records, request coercion, and the sale planner. It has zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Browser (pages + fetch() against /api)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shopkeep-server (axum)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopkeep-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   sale    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ SalePlan  │  │ coercion  │  │   │
//! │  │   │   Sale    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shopkeep-db (SQLite)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Sale, SaleItem, DashboardSummary)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Coercion of loosely-typed JSON input into domain input
//! - [`sale`] - Two-phase sale planning (validate everything, then mutate)
//!
//! ## Example Usage
//!
//! ```rust
//! use shopkeep_core::money::Money;
//!
//! let price: Money = "9.99".parse().unwrap();
//! let line_total = price.multiply_quantity(3);
//!
//! assert_eq!(line_total.cents(), 2997);
//! assert_eq!(line_total.to_string(), "$29.97");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use sale::{PlannedLine, SalePlan, StockDecrement};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products with fewer units than this on hand count as "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of sales shown in the dashboard's recent list.
pub const RECENT_SALES_LIMIT: i64 = 5;

/// Maximum product name length (characters).
pub const MAX_NAME_LEN: usize = 100;
