//! # Validation Module
//!
//! Coerces loosely-typed JSON request bodies into validated domain input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser (main.js)                                            │
//! │  ├── Form fields, required attributes                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (axum)                                          │
//! │  ├── Body must be JSON                                                 │
//! │  └── THIS MODULE: field coercion + business rule validation            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coercion Rules
//! Clients send numbers both as JSON numbers and as strings (form fields
//! arrive as text). Both are accepted:
//!
//! | Field            | Accepted                                   | Rule          |
//! |------------------|--------------------------------------------|---------------|
//! | `price`          | `9.99`, `"9.99"`, `10`                     | ≥ 0, 2 dp max |
//! | `stock_quantity` | `5`, `5.0`, `"5"`                          | ≥ 0           |
//! | `quantity`       | `3`, `3.0`, `"3"`                          | > 0           |
//! | `name`           | non-empty string, trimmed                  | ≤ 100 chars   |
//! | `description`    | string, `null` or missing (→ `""`)         |               |
//!
//! ## Usage
//! ```rust
//! use serde_json::json;
//! use shopkeep_core::validation::parse_product_input;
//!
//! let input = parse_product_input(&json!({
//!     "name": "Widget",
//!     "price": "9.99",
//!     "stock_quantity": 5,
//! }))
//! .unwrap();
//!
//! assert_eq!(input.price.cents(), 999);
//! assert_eq!(input.description, "");
//! ```

use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, ParseMoneyError, MINOR_DIGITS};
use crate::types::{ProductInput, SaleLine};
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Request Bodies
// =============================================================================

/// Parses a product create/update body.
///
/// `name`, `price` and `stock_quantity` are required; `description` is
/// optional. Updates are full overwrites, so the same rules apply to both.
pub fn parse_product_input(body: &Value) -> ValidationResult<ProductInput> {
    let fields = expect_object(body)?;

    let name = match fields.get("name") {
        None | Some(Value::Null) => return Err(ValidationError::required("name")),
        Some(Value::String(name)) => validate_product_name(name)?,
        Some(_) => return Err(ValidationError::invalid("name", "must be a string")),
    };

    let description = match fields.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(description)) => description.clone(),
        Some(_) => {
            return Err(ValidationError::invalid(
                "description",
                "must be a string",
            ))
        }
    };

    let price = coerce_price("price", required(fields, "price")?)?;
    let stock_quantity = coerce_stock("stock_quantity", required(fields, "stock_quantity")?)?;

    Ok(ProductInput {
        name,
        description,
        price,
        stock_quantity,
    })
}

/// Parses a sale body: `{"items": [{"product_id": .., "quantity": ..}, ..]}`.
///
/// A missing or empty `items` list is [`CoreError::EmptySale`]. Every line is
/// coerced before anything is looked up, so a malformed line anywhere in the
/// list fails the whole request.
pub fn parse_sale_request(body: &Value) -> CoreResult<Vec<SaleLine>> {
    let fields = expect_object(body)?;

    let items = match fields.get("items") {
        None | Some(Value::Null) => return Err(CoreError::EmptySale),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::invalid("items", "must be a list").into()),
    };

    if items.is_empty() {
        return Err(CoreError::EmptySale);
    }

    let mut lines = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let item_field = format!("items[{idx}]");
        let Value::Object(item) = item else {
            return Err(ValidationError::invalid(item_field, "must be an object").into());
        };

        let id_field = format!("{item_field}.product_id");
        let product_id = match item.get("product_id") {
            None | Some(Value::Null) => return Err(ValidationError::required(id_field).into()),
            Some(value) => coerce_integer(&id_field, value)?,
        };

        let qty_field = format!("{item_field}.quantity");
        let quantity = match item.get("quantity") {
            None | Some(Value::Null) => return Err(ValidationError::required(qty_field).into()),
            Some(value) => coerce_quantity(&qty_field, value)?,
        };

        lines.push(SaleLine::new(product_id, quantity));
    }

    Ok(lines)
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use shopkeep_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Widget ").unwrap(), "Widget");
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Coerces a price from a JSON number or numeric string.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - At most two decimal places
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use shopkeep_core::validation::coerce_price;
///
/// assert_eq!(coerce_price("price", &json!(9.99)).unwrap().cents(), 999);
/// assert_eq!(coerce_price("price", &json!("10")).unwrap().cents(), 1000);
/// assert!(coerce_price("price", &json!(-1)).is_err());
/// assert!(coerce_price("price", &json!("9.999")).is_err());
/// ```
pub fn coerce_price(field: &str, value: &Value) -> ValidationResult<Money> {
    let text = match value {
        // serde_json prints floats with the shortest round-trip form, so
        // 9.99 comes back as "9.99" rather than its binary expansion
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Null => return Err(ValidationError::required(field)),
        _ => return Err(ValidationError::invalid(field, "must be a number")),
    };

    let price = text.parse::<Money>().map_err(|e| match e {
        ParseMoneyError::Empty => ValidationError::required(field),
        ParseMoneyError::TooManyDecimals => ValidationError::TooManyDecimals {
            field: field.to_string(),
            max: MINOR_DIGITS,
        },
        ParseMoneyError::Invalid | ParseMoneyError::Overflow => {
            ValidationError::invalid(field, e.to_string())
        }
    })?;

    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(price)
}

/// Coerces a stock level. Must be non-negative.
pub fn coerce_stock(field: &str, value: &Value) -> ValidationResult<i64> {
    let stock = coerce_integer(field, value)?;

    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(stock)
}

/// Coerces a sale line quantity. Must be positive (> 0).
pub fn coerce_quantity(field: &str, value: &Value) -> ValidationResult<i64> {
    let qty = coerce_integer(field, value)?;

    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(qty)
}

/// Coerces an integer from a JSON integer, an integral float (`5.0`) or an
/// integer string (`"5"`).
pub fn coerce_integer(field: &str, value: &Value) -> ValidationResult<i64> {
    let not_integer = || ValidationError::invalid(field, "must be a whole number");

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(not_integer()),
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(ValidationError::required(field));
            }
            s.parse::<i64>().map_err(|_| not_integer())
        }
        Value::Null => Err(ValidationError::required(field)),
        _ => Err(not_integer()),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn expect_object(body: &Value) -> ValidationResult<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ValidationError::invalid("body", "must be a JSON object"))
}

fn required<'a>(fields: &'a Map<String, Value>, field: &str) -> ValidationResult<&'a Value> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ValidationError::required(field)),
        Some(value) => Ok(value),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name("Widget").unwrap(), "Widget");
        assert_eq!(validate_product_name("  Widget  ").unwrap(), "Widget");
        assert!(validate_product_name(&"A".repeat(100)).is_ok());

        assert_eq!(
            validate_product_name("   "),
            Err(ValidationError::required("name"))
        );
        assert!(matches!(
            validate_product_name(&"A".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_price("price", &json!(9.99)).unwrap().cents(), 999);
        assert_eq!(coerce_price("price", &json!(10)).unwrap().cents(), 1000);
        assert_eq!(coerce_price("price", &json!("2.5")).unwrap().cents(), 250);
        assert_eq!(coerce_price("price", &json!(0)).unwrap(), Money::zero());

        assert!(matches!(
            coerce_price("price", &json!(-0.01)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerce_price("price", &json!(1.005)),
            Err(ValidationError::TooManyDecimals { max: 2, .. })
        ));
        assert!(matches!(
            coerce_price("price", &json!("cheap")),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            coerce_price("price", &json!(true)),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_coerce_stock() {
        assert_eq!(coerce_stock("stock_quantity", &json!(5)).unwrap(), 5);
        assert_eq!(coerce_stock("stock_quantity", &json!(5.0)).unwrap(), 5);
        assert_eq!(coerce_stock("stock_quantity", &json!("7")).unwrap(), 7);
        assert_eq!(coerce_stock("stock_quantity", &json!(0)).unwrap(), 0);

        assert!(coerce_stock("stock_quantity", &json!(-1)).is_err());
        assert!(coerce_stock("stock_quantity", &json!(2.5)).is_err());
        assert!(coerce_stock("stock_quantity", &json!("five")).is_err());
        assert!(coerce_stock("stock_quantity", &json!([1])).is_err());
    }

    #[test]
    fn test_coerce_quantity() {
        assert_eq!(coerce_quantity("quantity", &json!(3)).unwrap(), 3);
        assert_eq!(coerce_quantity("quantity", &json!("3")).unwrap(), 3);

        assert_eq!(
            coerce_quantity("quantity", &json!(0)),
            Err(ValidationError::MustBePositive {
                field: "quantity".to_string()
            })
        );
        assert!(coerce_quantity("quantity", &json!(-2)).is_err());
    }

    #[test]
    fn test_parse_product_input() {
        let input = parse_product_input(&json!({
            "name": " Widget ",
            "description": "A widget",
            "price": 9.99,
            "stock_quantity": "5",
        }))
        .unwrap();

        assert_eq!(input.name, "Widget");
        assert_eq!(input.description, "A widget");
        assert_eq!(input.price.cents(), 999);
        assert_eq!(input.stock_quantity, 5);

        let input = parse_product_input(&json!({
            "name": "Gadget",
            "description": null,
            "price": "1",
            "stock_quantity": 0,
        }))
        .unwrap();
        assert_eq!(input.description, "");
    }

    #[test]
    fn test_parse_product_input_missing_fields() {
        let err = parse_product_input(&json!({"price": 1, "stock_quantity": 1})).unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = parse_product_input(&json!({"name": "W", "stock_quantity": 1})).unwrap_err();
        assert_eq!(err.to_string(), "price is required");

        let err = parse_product_input(&json!({"name": "W", "price": 1})).unwrap_err();
        assert_eq!(err.to_string(), "stock_quantity is required");

        assert!(parse_product_input(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_parse_sale_request() {
        let lines = parse_sale_request(&json!({
            "items": [
                {"product_id": 1, "quantity": 3},
                {"product_id": "2", "quantity": "1"},
            ]
        }))
        .unwrap();

        assert_eq!(lines, vec![SaleLine::new(1, 3), SaleLine::new(2, 1)]);
    }

    #[test]
    fn test_parse_sale_request_empty() {
        assert_eq!(
            parse_sale_request(&json!({"items": []})),
            Err(CoreError::EmptySale)
        );
        assert_eq!(parse_sale_request(&json!({})), Err(CoreError::EmptySale));
    }

    #[test]
    fn test_parse_sale_request_bad_lines() {
        let err = parse_sale_request(&json!({"items": [{"product_id": 1, "quantity": 0}]}))
            .unwrap_err();
        assert_eq!(err.to_string(), "items[0].quantity must be positive");

        let err = parse_sale_request(&json!({
            "items": [{"product_id": 1, "quantity": 1}, {"quantity": 1}]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "items[1].product_id is required");

        let err = parse_sale_request(&json!({"items": "lots"})).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
