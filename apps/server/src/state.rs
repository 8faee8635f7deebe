//! # Router State
//!
//! Shared state handed to every handler through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  Router::with_state(AppState)                                          │
//! │          │                                                              │
//! │          ├──────────────────────┐                                       │
//! │          ▼                      ▼                                       │
//! │  ┌──────────────┐      ┌──────────────────┐                            │
//! │  │  Database    │      │  Arc<Views>      │                            │
//! │  │  (SQLite     │      │  (compiled Tera  │                            │
//! │  │   pool)      │      │   templates)     │                            │
//! │  └──────────────┘      └──────────────────┘                            │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: the pool is internally synchronized, clones share it      │
//! │  • Views: read-only after startup                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No other in-process mutable state exists; every request stands alone.

use std::sync::Arc;

use shopkeep_db::Database;

use crate::views::Views;

/// State cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(db: Database, views: Views) -> Self {
        AppState {
            db,
            views: Arc::new(views),
        }
    }
}
