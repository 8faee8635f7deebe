//! # Page Handlers
//!
//! Server-rendered views over the same repositories the JSON API uses.
//! The sales page posts to `/api/sales` from the browser.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use serde::Serialize;
use serde_json::json;

use shopkeep_core::{Product, LOW_STOCK_THRESHOLD};

use super::dashboard::DashboardDto;
use super::products::ProductDto;
use super::sales::SaleDto;
use crate::error::ApiError;
use crate::state::AppState;

/// Shared browser helpers (currency formatting, notifications, API calls).
const MAIN_JS: &str = include_str!("../../static/js/main.js");

fn render(state: &AppState, template: &str, data: serde_json::Value) -> Result<Html<String>, ApiError> {
    state
        .views
        .render(template, &data)
        .map(Html)
        .map_err(|e| ApiError::internal(format!("rendering {}: {:?}", template, e)))
}

/// `GET /`: dashboard.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let summary = DashboardDto::from(state.db.dashboard().summary().await?);
    render(
        &state,
        "index.html",
        json!({ "summary": summary, "low_stock_threshold": LOW_STOCK_THRESHOLD }),
    )
}

/// Inventory table row: the product plus its stock flag.
#[derive(Debug, Serialize)]
struct InventoryRow {
    #[serde(flatten)]
    product: ProductDto,
    low_stock: bool,
}

impl From<Product> for InventoryRow {
    fn from(product: Product) -> Self {
        InventoryRow {
            low_stock: product.is_low_stock(),
            product: product.into(),
        }
    }
}

/// `GET /inventory`: every product by name.
pub async fn inventory(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let products: Vec<InventoryRow> = state
        .db
        .products()
        .list()
        .await?
        .into_iter()
        .map(InventoryRow::from)
        .collect();

    render(
        &state,
        "inventory.html",
        json!({ "products": products }),
    )
}

/// `GET /sales`: sale entry form, listing only products with stock.
pub async fn sales(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let products: Vec<ProductDto> = state
        .db
        .products()
        .list_available()
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    render(&state, "sales.html", json!({ "products": products }))
}

/// `GET /history`: all sales, newest first.
pub async fn history(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let sales: Vec<SaleDto> = state
        .db
        .sales()
        .list()
        .await?
        .into_iter()
        .map(SaleDto::from)
        .collect();

    render(&state, "history.html", json!({ "sales": sales }))
}

/// `GET /static/js/main.js`
pub async fn main_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        MAIN_JS,
    )
}
