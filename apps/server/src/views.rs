//! # Page Templates
//!
//! Server-rendered pages built with Tera. Templates are compiled into the
//! binary and parsed once at startup, so a broken template fails the boot
//! rather than the first request.
//!
//! ## Templates
//! | Name             | Route        | Context                               |
//! |------------------|--------------|---------------------------------------|
//! | `index.html`     | `/`          | `summary` (dashboard figures)         |
//! | `inventory.html` | `/inventory` | `products` (all, by name)             |
//! | `sales.html`     | `/sales`     | `products` (stock > 0, by name)       |
//! | `history.html`   | `/history`   | `sales` (newest first, with items)    |
//!
//! All extend `base.html`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

/// Compiled page templates.
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Parses the embedded templates and registers the custom filters.
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("inventory.html", include_str!("../templates/inventory.html")),
            ("sales.html", include_str!("../templates/sales.html")),
            ("history.html", include_str!("../templates/history.html")),
        ])?;
        tera.register_filter("money", money_filter);

        Ok(Views { tera })
    }

    /// Renders `template` with the fields of `data` as top-level variables.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> tera::Result<String> {
        let context = Context::from_serialize(data)?;
        self.tera.render(template, &context)
    }
}

/// `{{ 29.97 | money }}` → `$29.97`
fn money_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("money filter expects a number, got {}", value)))?;

    let formatted = if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    };

    Ok(Value::String(formatted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_templates_compile() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn test_money_filter() {
        let args = HashMap::new();
        assert_eq!(money_filter(&json!(29.97), &args).unwrap(), json!("$29.97"));
        assert_eq!(money_filter(&json!(5), &args).unwrap(), json!("$5.00"));
        assert_eq!(money_filter(&json!(-5.5), &args).unwrap(), json!("-$5.50"));
        assert!(money_filter(&json!("abc"), &args).is_err());
    }

    #[test]
    fn test_render_inventory() {
        let views = Views::new().unwrap();
        let html = views
            .render(
                "inventory.html",
                &json!({
                    "products": [{
                        "id": 1,
                        "name": "Widget",
                        "description": "",
                        "price": 9.99,
                        "stock_quantity": 3,
                        "created_at": "2024-01-01 09:30:00",
                        "low_stock": true,
                    }],
                }),
            )
            .unwrap();

        assert!(html.contains("Widget"));
        assert!(html.contains("$9.99"));
        assert!(html.contains(r#"class="low-stock""#));
    }
}
