//! # shopkeep-server
//!
//! HTTP front end for Shopkeep: a JSON API plus server-rendered pages over
//! one SQLite database.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  request ──► request_id (span + X-Request-ID) ──► TraceLayer           │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │                                                  Router (axum)          │
//! │                                                       │                 │
//! │                       ┌───────────────┬───────────────┼─────────────┐   │
//! │                       ▼               ▼               ▼             ▼   │
//! │                   products         sales         dashboard        pages │
//! │                       │               │               │             │   │
//! │                       └───────────────┴───────┬───────┴─────────────┘   │
//! │                                               ▼                         │
//! │                                   shopkeep-db repositories              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod views;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::handlers::{dashboard, pages, products, sales};

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use state::AppState;
pub use views::Views;

/// Builds the full router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // JSON API
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/sales", get(sales::list_sales).post(sales::create_sale))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/health", get(dashboard::health))
        // Pages
        .route("/", get(pages::index))
        .route("/inventory", get(pages::inventory))
        .route("/sales", get(pages::sales))
        .route("/history", get(pages::history))
        .route("/static/js/main.js", get(pages::main_js))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - Default: INFO, DEBUG for shopkeep crates, WARN for sqlx
/// - Set `RUST_LOG` to override
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopkeep=debug,tower_http=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// Router Tests
// =============================================================================
