//! # Sale Planning
//!
//! Phase 1 of sale processing: validate every requested line against a
//! snapshot of the involved products and produce a complete plan. Nothing is
//! mutated here; the database layer applies the plan in one transaction.
//!
//! ## Two-Phase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  lines ──► SalePlan::build(lines, snapshot)        (pure, this module)  │
//! │              │                                                          │
//! │              ├── empty?                 → EmptySale                     │
//! │              ├── product missing?       → ProductNotFound(id)           │
//! │              ├── qty or total overflow  → Validation(OutOfRange)        │
//! │              ├── cumulative qty > stock → InsufficientStock             │
//! │              │                                                          │
//! │              ▼                                                          │
//! │           SalePlan { lines, decrements, total }                         │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  shopkeep-db: guarded UPDATEs + INSERTs, then COMMIT  (phase 2)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are checked in request order, so the first failing line decides the
//! error. A product listed twice is checked against its cumulative quantity.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, SaleLine};

/// A validated sale line with its price snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl PlannedLine {
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Total stock to take from one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: i64,
    pub quantity: i64,
}

/// Everything phase 2 needs to write a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    /// One entry per requested line, in request order.
    pub lines: Vec<PlannedLine>,
    /// One entry per distinct product, in first-seen order.
    pub decrements: Vec<StockDecrement>,
    pub total: Money,
}

impl SalePlan {
    /// Validates `lines` against `products` and builds the plan.
    ///
    /// `products` is a snapshot keyed by id; ids absent from it are treated
    /// as nonexistent.
    ///
    /// ## Example
    /// ```rust
    /// use std::collections::HashMap;
    /// use chrono::Utc;
    /// use shopkeep_core::{Money, Product, SaleLine, SalePlan};
    ///
    /// let widget = Product {
    ///     id: 1,
    ///     name: "Widget".into(),
    ///     description: String::new(),
    ///     price: Money::from_cents(999),
    ///     stock_quantity: 5,
    ///     created_at: Utc::now(),
    /// };
    /// let snapshot = HashMap::from([(1, widget)]);
    ///
    /// let plan = SalePlan::build(&[SaleLine::new(1, 3)], &snapshot).unwrap();
    /// assert_eq!(plan.total.cents(), 2997);
    /// ```
    pub fn build(lines: &[SaleLine], products: &HashMap<i64, Product>) -> CoreResult<Self> {
        if lines.is_empty() {
            return Err(CoreError::EmptySale);
        }

        let mut planned = Vec::with_capacity(lines.len());
        let mut decrements: Vec<StockDecrement> = Vec::new();
        let mut total = Money::zero();

        for (index, line) in lines.iter().enumerate() {
            let product = products
                .get(&line.product_id)
                .ok_or(CoreError::ProductNotFound(line.product_id))?;

            let requested = match decrements
                .iter_mut()
                .find(|d| d.product_id == line.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or_else(|| out_of_range(format!("items[{index}].quantity"), 1))?;
                    existing.quantity
                }
                None => {
                    decrements.push(StockDecrement {
                        product_id: line.product_id,
                        quantity: line.quantity,
                    });
                    line.quantity
                }
            };

            if !product.can_sell(requested) {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                    available: product.stock_quantity,
                    requested,
                });
            }

            let line = PlannedLine {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
            };
            total = line
                .unit_price
                .checked_multiply_quantity(line.quantity)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or_else(|| out_of_range("total".to_string(), 0))?;
            planned.push(line);
        }

        Ok(SalePlan {
            lines: planned,
            decrements,
            total,
        })
    }

    /// Distinct product ids referenced by `lines`, in first-seen order.
    ///
    /// Used to load the snapshot before calling [`SalePlan::build`].
    pub fn product_ids(lines: &[SaleLine]) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::with_capacity(lines.len());
        for line in lines {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id);
            }
        }
        ids
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

/// Quantities and totals are stored as `i64`; anything past that is refused.
fn out_of_range(field: String, min: i64) -> CoreError {
    ValidationError::OutOfRange {
        field,
        min,
        max: i64::MAX,
    }
    .into()
}
