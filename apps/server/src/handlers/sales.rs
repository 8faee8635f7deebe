//! # Sale Handlers
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    POST /api/sales                                      │
//! │                                                                         │
//! │  {"items": [{"product_id": 1, "quantity": 3}]}                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  parse_sale_request ──── empty/missing items ──► 400 No items in sale  │
//! │       │              └── bad line field ───────► 400 items[i].field .. │
//! │       ▼                                                                 │
//! │  SaleRepository::process_sale (one transaction)                        │
//! │       │              ├── unknown product ──────► 404 Product N not found│
//! │       │              └── short on stock ───────► 400 Insufficient stock│
//! │       ▼                                                                 │
//! │  201 + Sale with items and subtotals                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use ts_rs::TS;

use shopkeep_core::validation::parse_sale_request;
use shopkeep_core::{Sale, SaleItem};

use super::format_timestamp;
use crate::error::ApiError;
use crate::state::AppState;

/// Sale line as returned to clients, with its subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SaleItemDto {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price_at_sale: f64,
    pub subtotal: f64,
}

impl From<SaleItem> for SaleItemDto {
    fn from(item: SaleItem) -> Self {
        SaleItemDto {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_sale: item.price_at_sale.as_decimal(),
            subtotal: item.subtotal().as_decimal(),
            product_name: item.product_name,
        }
    }
}

/// Sale as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SaleDto {
    pub id: i64,
    pub sale_date: String,
    pub total_amount: f64,
    pub items: Vec<SaleItemDto>,
}

impl From<Sale> for SaleDto {
    fn from(sale: Sale) -> Self {
        SaleDto {
            id: sale.id,
            sale_date: format_timestamp(&sale.sale_date),
            total_amount: sale.total_amount.as_decimal(),
            items: sale.items.into_iter().map(SaleItemDto::from).collect(),
        }
    }
}

/// `GET /api/sales`: newest first.
pub async fn list_sales(State(state): State<AppState>) -> Result<Json<Vec<SaleDto>>, ApiError> {
    let sales = state.db.sales().list().await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

/// `POST /api/sales`: 201 with the recorded sale.
pub async fn create_sale(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleDto>), ApiError> {
    let Json(body) = body?;
    let lines = parse_sale_request(&body)?;

    let sale = match state.db.sales().process_sale(&lines).await {
        Ok(sale) => sale,
        Err(e) => {
            warn!(lines = lines.len(), error = %e, "Sale rejected");
            return Err(e.into());
        }
    };

    debug!(
        sale_id = sale.id,
        units = sale.unit_count(),
        "Sale response ready"
    );

    Ok((StatusCode::CREATED, Json(sale.into())))
}
