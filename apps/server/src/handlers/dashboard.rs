//! Dashboard figures and the health probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use shopkeep_core::DashboardSummary;

use super::sales::SaleDto;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DashboardDto {
    pub total_products: i64,
    pub total_sales: i64,
    pub low_stock_products: i64,
    pub recent_sales: Vec<SaleDto>,
    pub total_revenue: f64,
}

impl From<DashboardSummary> for DashboardDto {
    fn from(s: DashboardSummary) -> Self {
        DashboardDto {
            total_products: s.total_products,
            total_sales: s.total_sales,
            low_stock_products: s.low_stock_products,
            recent_sales: s.recent_sales.into_iter().map(SaleDto::from).collect(),
            total_revenue: s.total_revenue.as_decimal(),
        }
    }
}

/// `GET /api/dashboard`
pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardDto>, ApiError> {
    let summary = state.db.dashboard().summary().await?;
    Ok(Json(summary.into()))
}

/// `GET /health`: `OK` while the database answers.
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}
