//! # Repository Module
//!
//! Database repository implementations for Shopkeep.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.products().list()                                    │
//! │       ▼                                                                 │
//! │  ProductRepository / SaleRepository / DashboardRepository              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog store (product CRUD, stock filters)
//! - [`sale::SaleRepository`] - Sale processor and sales ledger
//! - [`dashboard::DashboardRepository`] - Read-only summary figures

pub mod dashboard;
pub mod product;
pub mod sale;

/// Column list shared by every product query.
///
/// Money columns are aliased to the domain field names so `FromRow` can
/// decode straight into [`shopkeep_core::Product`].
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents AS price, stock_quantity, created_at";
