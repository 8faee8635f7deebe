//! # HTTP Handlers
//!
//! One module per resource. Handlers only coerce input, call a repository,
//! and shape the result; business rules live in `shopkeep-core` and the
//! sale transaction lives in `shopkeep-db`.
//!
//! ## Routes
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Route                        │ Handler                                  │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ GET    /api/products         │ products::list_products                  │
//! │ POST   /api/products         │ products::create_product                 │
//! │ GET    /api/products/{id}    │ products::get_product                    │
//! │ PUT    /api/products/{id}    │ products::update_product                 │
//! │ DELETE /api/products/{id}    │ products::delete_product                 │
//! │ GET    /api/sales            │ sales::list_sales                        │
//! │ POST   /api/sales            │ sales::create_sale                       │
//! │ GET    /api/dashboard        │ dashboard::get_dashboard                 │
//! │ GET    /health               │ dashboard::health                        │
//! │ GET    / /inventory /sales   │ pages::*                                 │
//! │ GET    /history              │ pages::history                           │
//! │ GET    /static/js/main.js    │ pages::main_js                           │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```

pub mod dashboard;
pub mod pages;
pub mod products;
pub mod sales;

use chrono::{DateTime, Utc};

/// Wire format for every timestamp in JSON and on the pages.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
