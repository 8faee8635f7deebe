//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopkeep                               │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<Json<T>, ApiError>                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Bad JSON? ─────────── JsonRejection ──────────────┐                   │
//! │         │                                          │                   │
//! │         ▼                                          │                   │
//! │  Bad field? ────────── ValidationError ────────────┤                   │
//! │         │                                          │                   │
//! │         ▼                                          ▼                   │
//! │  Sale rule? ────────── CoreError ──────────────► ApiError              │
//! │         │                                          ▲        │          │
//! │         ▼                                          │        ▼          │
//! │  Database? ─────────── DbError ────────────────────┘   IntoResponse    │
//! │                                                        status +        │
//! │                                                        {"error": ..}   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Mapping
//! | Source                                         | Status |
//! |------------------------------------------------|--------|
//! | malformed body, ValidationError, EmptySale     | 400    |
//! | InsufficientStock                              | 400    |
//! | DbError::NotFound, ProductNotFound             | 404    |
//! | ForeignKeyViolation (product with history)     | 409    |
//! | anything else                                  | 500    |
//!
//! 5xx details are logged and replaced with a generic message in the body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shopkeep_core::{CoreError, ValidationError};
use shopkeep_db::DbError;

/// Error returned from every handler.
///
/// ## Serialization
/// What the client receives when a request fails:
/// ```json
/// { "error": "Insufficient stock for Widget" }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,

    /// Machine-readable error code, carried into the logs
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Sale has no lines (400)
    EmptySale,

    /// Not enough stock for a sale line (400)
    InsufficientStock,

    /// Delete blocked by existing references (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::EmptySale => "EMPTY_SALE",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    /// Creates an internal error. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(detail = %detail, "Internal error");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "Internal server error",
        )
    }

    fn database(detail: impl std::fmt::Display, message: &str) -> Self {
        tracing::error!(detail = %detail, "Database error");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseError,
            message,
        )
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(e) => ApiError::from(e),
            e @ DbError::NotFound { .. } => ApiError::not_found(e.to_string()),
            DbError::ForeignKeyViolation { message } => {
                ApiError::new(StatusCode::CONFLICT, ErrorCode::Conflict, message)
            }
            DbError::Busy(e) => ApiError::database(e, "Database is busy, try again"),
            DbError::ConnectionFailed(e) => {
                ApiError::database(e, "Database connection failed")
            }
            DbError::MigrationFailed(e) => ApiError::database(e, "Database migration failed"),
            DbError::TransactionFailed(e) => {
                ApiError::database(e, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::database("pool exhausted", "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                ApiError::database(e, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::EmptySale => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::EmptySale, message)
            }
            CoreError::ProductNotFound(_) => ApiError::not_found(message),
            CoreError::InsufficientStock { .. } => ApiError::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::InsufficientStock,
                message,
            ),
            CoreError::Validation(_) => ApiError::validation(message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or missing JSON bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Request rejected"
            );
        }

        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_errors_map_to_statuses() {
        let err = ApiError::from(DbError::Core(CoreError::EmptySale));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No items in sale");

        let err = ApiError::from(DbError::Core(CoreError::ProductNotFound(42)));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Product 42 not found");

        let err = ApiError::from(CoreError::InsufficientStock {
            product_id: 1,
            name: "Widget".into(),
            available: 2,
            requested: 5,
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Insufficient stock for Widget");
    }

    #[test]
    fn test_db_errors_map_to_statuses() {
        let err = ApiError::from(DbError::not_found("Product", 7));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Product 7 not found");

        let err = ApiError::from(DbError::ForeignKeyViolation {
            message: "Product 1 has sales history and cannot be deleted".into(),
        });
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = ApiError::from(DbError::QueryFailed("no such table: products".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_validation_error_message() {
        let err = ApiError::from(ValidationError::required("name"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "name is required");
    }
}
