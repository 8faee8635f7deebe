//! # Domain Types
//!
//! Core domain records used throughout Shopkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │◄──┼─────────────────┼───│  product_id(FK) │       │
//! │  │  price          │   │  sale_date      │◄──│  sale_id (FK)   │       │
//! │  │  stock_quantity │   │  total_amount   │   │  quantity       │       │
//! │  │  created_at     │   │  items ─────────┼──►│  price_at_sale  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `SaleItem::price_at_sale` is copied from the product when the sale is
//! made. Later price changes never alter historical sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Row identifier assigned by the store.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-form description; empty when none was given.
    pub description: String,

    /// Current unit price.
    pub price: Money,

    /// Units on hand. Never negative.
    pub stock_quantity: i64,

    /// When the product was created. Immutable.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }

    /// Checks whether the product is flagged low on the inventory page.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < LOW_STOCK_THRESHOLD
    }
}

/// Validated fields for creating or fully overwriting a product.
///
/// Produced by [`crate::validation::parse_product_input`]; every field is
/// already coerced and range-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock_quantity: i64,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Name of the referenced product (read through the foreign key).
    pub product_name: String,
    /// Units sold. Always positive.
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub price_at_sale: Money,
}

impl SaleItem {
    /// Line subtotal (`quantity × price_at_sale`), computed on read.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.price_at_sale.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    /// Sum of item subtotals, fixed when the sale was made.
    pub total_amount: Money,
    /// Line items in insertion order. Loaded separately from the sale row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Recomputes the total from the line items.
    ///
    /// Always equal to `total_amount` for sales written by the sale processor.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleItem::subtotal).sum()
    }

    /// Total number of units across all lines, saturating at `i64::MAX`.
    pub fn unit_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |units, item| units.saturating_add(item.quantity))
    }
}

/// One requested line of a sale, before validation against stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: i64,
    pub quantity: i64,
}

impl SaleLine {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        SaleLine {
            product_id,
            quantity,
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Read-only summary figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_sales: i64,
    /// Products with fewer than [`LOW_STOCK_THRESHOLD`] units on hand.
    pub low_stock_products: i64,
    /// Newest sales first, at most [`crate::RECENT_SALES_LIMIT`].
    pub recent_sales: Vec<Sale>,
    /// Sum of every sale's `total_amount`; zero when there are no sales.
    pub total_revenue: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock: i64) -> Product {
        Product {
            id: 1,
            name: "Widget".to_string(),
            description: String::new(),
            price: Money::from_cents(999),
            stock_quantity: stock,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_stock_predicates() {
        let product = widget(5);
        assert!(product.can_sell(5));
        assert!(!product.can_sell(6));
        assert!(product.is_low_stock());

        assert!(widget(0).is_low_stock());
        assert!(!widget(10).is_low_stock());
        assert!(widget(9).is_low_stock());
    }

    #[test]
    fn test_sale_items_total() {
        let sale = Sale {
            id: 1,
            sale_date: Utc::now(),
            total_amount: Money::from_cents(3497),
            items: vec![
                SaleItem {
                    id: 1,
                    sale_id: 1,
                    product_id: 1,
                    product_name: "Widget".to_string(),
                    quantity: 3,
                    price_at_sale: Money::from_cents(999),
                },
                SaleItem {
                    id: 2,
                    sale_id: 1,
                    product_id: 2,
                    product_name: "Gadget".to_string(),
                    quantity: 1,
                    price_at_sale: Money::from_cents(500),
                },
            ],
        };

        assert_eq!(sale.items[0].subtotal().cents(), 2997);
        assert_eq!(sale.items_total(), sale.total_amount);
        assert_eq!(sale.unit_count(), 4);

        let mut bulk = sale.clone();
        bulk.items[0].quantity = i64::MAX;
        assert_eq!(bulk.unit_count(), i64::MAX);
    }
}
