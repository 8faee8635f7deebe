//! # Product Handlers
//!
//! Catalog CRUD over JSON.
//!
//! ## Update Semantics
//! `PUT` is a full overwrite: name, price and stock_quantity are required,
//! a missing description becomes empty. The product must exist before the
//! body is looked at, so an unknown id is a 404 even with a bad body.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use ts_rs::TS;

use shopkeep_core::validation::parse_product_input;
use shopkeep_core::Product;

use super::format_timestamp;
use crate::error::ApiError;
use crate::state::AppState;

/// Product as the API and the pages see it.
///
/// Prices are decimal major units (`9.99`), timestamps are
/// `YYYY-MM-DD HH:MM:SS` in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub created_at: String,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            price: p.price.as_decimal(),
            created_at: format_timestamp(&p.created_at),
            name: p.name,
            description: p.description,
            stock_quantity: p.stock_quantity,
        }
    }
}

/// `GET /api/products`: every product, ordered by name.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductDto>, ApiError> {
    let product = state.db.products().get(id).await?;
    Ok(Json(product.into()))
}

/// `POST /api/products`: 201 with the created product.
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let Json(body) = body?;
    let input = parse_product_input(&body)?;

    let product = state.db.products().create(&input).await?;
    info!(
        product_id = product.id,
        name = %product.name,
        price = %product.price,
        stock = product.stock_quantity,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /api/products/{id}`: full overwrite.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProductDto>, ApiError> {
    let products = state.db.products();
    products.get(id).await?;

    let Json(body) = body?;
    let input = parse_product_input(&body)?;

    let product = products.update(id, &input).await?;
    info!(product_id = id, stock = product.stock_quantity, "Product updated");

    Ok(Json(product.into()))
}

/// `DELETE /api/products/{id}`: 409 when sales reference the product.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.db.products().delete(id).await?;
    info!(product_id = id, "Product deleted");

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
