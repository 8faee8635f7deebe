//! # Sale Repository
//!
//! The sale processor and the sales ledger.
//!
//! ## Processing a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       process_sale(lines)                               │
//! │                                                                         │
//! │  BEGIN IMMEDIATE   (takes the write lock up front)                     │
//! │   │                                                                     │
//! │   ├── 1. SNAPSHOT   SELECT each referenced product                     │
//! │   │                                                                     │
//! │   ├── 2. PLAN       SalePlan::build(lines, snapshot)   (shopkeep-core) │
//! │   │                 EmptySale / ProductNotFound / InsufficientStock    │
//! │   │                                                                     │
//! │   ├── 3. DECREMENT  UPDATE products SET stock = stock - q              │
//! │   │                 WHERE id = ? AND stock >= q     (0 rows → abort)   │
//! │   │                                                                     │
//! │   ├── 4. INSERT     one sales row + one sale_items row per line        │
//! │   │                                                                     │
//! │  COMMIT  (any error above drops the transaction → ROLLBACK)            │
//! │                                                                         │
//! │  Competing sales wait on busy_timeout for BEGIN IMMEDIATE; a          │
//! │  SQLITE_BUSY that still escapes → retry the whole unit, up to          │
//! │  SALE_RETRY_LIMIT                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable once written. Items are read back joined to their
//! product for the name; subtotals are computed on read.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::PRODUCT_COLUMNS;
use crate::error::{DbError, DbResult};
use shopkeep_core::{CoreError, Product, Sale, SaleItem, SaleLine, SalePlan, StockDecrement};

/// How many times a sale is attempted when SQLite reports the database busy.
pub const SALE_RETRY_LIMIT: u32 = 3;

/// Pause between busy retries, multiplied by the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

const SALE_COLUMNS: &str = "id, sale_date, total_cents AS total_amount";

const ITEM_SELECT: &str = r#"
    SELECT
        si.id,
        si.sale_id,
        si.product_id,
        p.name AS product_name,
        si.quantity,
        si.price_at_sale_cents AS price_at_sale
    FROM sale_items si
    INNER JOIN products p ON p.id = si.product_id
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Sale Processor
    // =========================================================================

    /// Records a sale and takes its quantities out of stock, all or nothing.
    ///
    /// ## Errors
    /// * `DbError::Core(CoreError::EmptySale)` - `lines` is empty
    /// * `DbError::Core(CoreError::ProductNotFound)` - a line names an unknown product
    /// * `DbError::Core(CoreError::InsufficientStock)` - not enough stock, including
    ///   when a concurrent sale took it first
    /// * `DbError::Busy` - still busy after [`SALE_RETRY_LIMIT`] attempts
    ///
    /// On any error no stock changes and no sale is written.
    pub async fn process_sale(&self, lines: &[SaleLine]) -> DbResult<Sale> {
        if lines.is_empty() {
            return Err(CoreError::EmptySale.into());
        }

        let mut attempt = 1;
        loop {
            match self.try_process_sale(lines).await {
                Err(err) if err.is_busy() && attempt < SALE_RETRY_LIMIT => {
                    warn!(attempt, error = %err, "Database busy during sale, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// One attempt at the sale unit of work.
    ///
    /// The transaction starts IMMEDIATE so the snapshot is read under the
    /// write lock. A deferred transaction would read, then fail to upgrade
    /// with SQLITE_BUSY_SNAPSHOT once another sale commits in between.
    async fn try_process_sale(&self, lines: &[SaleLine]) -> DbResult<Sale> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        // Phase 1: validate every line against a consistent snapshot
        let snapshot = load_snapshot(&mut tx, &SalePlan::product_ids(lines)).await?;
        let plan = SalePlan::build(lines, &snapshot)?;

        // Phase 2: apply
        for decrement in &plan.decrements {
            apply_decrement(&mut tx, decrement).await?;
        }

        let sale_date = Utc::now();
        let sale_id = sqlx::query("INSERT INTO sales (sale_date, total_cents) VALUES (?1, ?2)")
            .bind(sale_date)
            .bind(plan.total)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let item_id = sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, price_at_sale_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            items.push(SaleItem {
                id: item_id,
                sale_id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                price_at_sale: line.unit_price,
            });
        }

        tx.commit()
            .await
            .map_err(|e| match DbError::from(e) {
                busy @ DbError::Busy(_) => busy,
                other => DbError::TransactionFailed(other.to_string()),
            })?;

        info!(
            sale_id,
            items = items.len(),
            total = %plan.total,
            "Sale recorded"
        );

        Ok(Sale {
            id: sale_id,
            sale_date,
            total_amount: plan.total,
            items,
        })
    }

    // =========================================================================
    // Sales Ledger
    // =========================================================================

    /// Lists all sales, newest first, each with its items.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date DESC, id DESC");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("{ITEM_SELECT} ORDER BY si.sale_id, si.id");
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(sales = sales.len(), items = items.len(), "Listed sales");
        Ok(attach_items(sales, items))
    }

    /// Lists the newest `limit` sales, each with its items.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date DESC, id DESC LIMIT ?1"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!(
            r#"{ITEM_SELECT}
            WHERE si.sale_id IN (
                SELECT id FROM sales ORDER BY sale_date DESC, id DESC LIMIT ?1
            )
            ORDER BY si.sale_id, si.id"#
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(attach_items(sales, items))
    }

    /// Gets one sale with its items.
    pub async fn get(&self, id: i64) -> DbResult<Sale> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let mut sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let sql = format!("{ITEM_SELECT} WHERE si.sale_id = ?1 ORDER BY si.id");
        sale.items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Deletes a sale; its items go with it (`ON DELETE CASCADE`).
    ///
    /// Stock is not restored.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sum of every sale's total; zero when there are none.
    ///
    /// Each total fits in `i64` cents (checked when the sale is planned),
    /// but their sum is not bounded. Past `i64::MAX` cents SQLite reports
    /// "integer overflow" and this returns `DbError::QueryFailed`.
    pub async fn total_revenue(&self) -> DbResult<shopkeep_core::Money> {
        let cents: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(shopkeep_core::Money::from_cents(cents))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Takes `decrement.quantity` units out of stock, or fails without touching it.
///
/// A zero-row update means stock moved since the snapshot; the product is
/// re-read to report what is there now.
async fn apply_decrement(
    tx: &mut Transaction<'_, Sqlite>,
    decrement: &StockDecrement,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2
        WHERE id = ?1 AND stock_quantity >= ?2
        "#,
    )
    .bind(decrement.product_id)
    .bind(decrement.quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let current = load_product(tx, decrement.product_id).await?;
    Err(match current {
        Some(product) => CoreError::InsufficientStock {
            product_id: product.id,
            name: product.name,
            available: product.stock_quantity,
            requested: decrement.quantity,
        },
        None => CoreError::ProductNotFound(decrement.product_id),
    }
    .into())
}

async fn load_product(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(product)
}

/// Reads the products a sale references. Unknown ids are simply absent.
async fn load_snapshot(
    tx: &mut Transaction<'_, Sqlite>,
    ids: &[i64],
) -> DbResult<HashMap<i64, Product>> {
    let mut snapshot = HashMap::with_capacity(ids.len());
    for &id in ids {
        if let Some(product) = load_product(tx, id).await? {
            snapshot.insert(id, product);
        }
    }
    Ok(snapshot)
}

/// Distributes items to their sales, keeping the sales' order.
fn attach_items(mut sales: Vec<Sale>, items: Vec<SaleItem>) -> Vec<Sale> {
    let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id).or_default().push(item);
    }

    for sale in &mut sales {
        sale.items = by_sale.remove(&sale.id).unwrap_or_default();
    }
    sales
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopkeep_core::{Money, ProductInput};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, name: &str, cents: i64, stock: i64) -> Product {
        db.products()
            .create(&ProductInput {
                name: name.to_string(),
                description: String::new(),
                price: Money::from_cents(cents),
                stock_quantity: stock,
            })
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get(id).await.unwrap().stock_quantity
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_snapshots_price() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 999, 5).await;

        let sale = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 3)])
            .await
            .unwrap();

        assert_eq!(sale.total_amount.cents(), 2997);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].price_at_sale, widget.price);
        assert_eq!(sale.items[0].product_name, "Widget");
        assert_eq!(stock_of(&db, widget.id).await, 2);

        let stored = db.sales().get(sale.id).await.unwrap();
        assert_eq!(stored, sale);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 999, 2).await;

        let err = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 5)])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Insufficient stock for Widget");
        assert_eq!(stock_of(&db, widget.id).await, 2);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_second_line_failure_rolls_back_first() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 999, 5).await;
        let gadget = add_product(&db, "Gadget", 500, 1).await;

        let err = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 2), SaleLine::new(gadget.id, 4)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock { ref name, .. }) if name == "Gadget"
        ));
        assert_eq!(stock_of(&db, widget.id).await, 5);
        assert_eq!(stock_of(&db, gadget.id).await, 1);
        assert!(db.sales().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_and_empty_sale() {
        let db = test_db().await;

        let err = db
            .sales()
            .process_sale(&[SaleLine::new(404, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product 404 not found");

        let err = db.sales().process_sale(&[]).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::EmptySale)));
    }

    #[tokio::test]
    async fn test_repeated_product_is_checked_cumulatively() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 100, 4).await;

        let err = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 3), SaleLine::new(widget.id, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(stock_of(&db, widget.id).await, 4);

        let sale = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 3), SaleLine::new(widget.id, 1)])
            .await
            .unwrap();
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.total_amount.cents(), 400);
        assert_eq!(stock_of(&db, widget.id).await, 0);
    }

    /// A database file under the temp dir, removed with its WAL files on drop.
    struct TempDbFile(std::path::PathBuf);

    impl TempDbFile {
        fn new() -> Self {
            static COUNTER: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);
            let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos();
            TempDbFile(std::env::temp_dir().join(format!(
                "shopkeep-{}-{}-{}.db",
                std::process::id(),
                nanos,
                n
            )))
        }
    }

    impl Drop for TempDbFile {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut path = self.0.clone().into_os_string();
                path.push(suffix);
                let _ = std::fs::remove_file(path);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_across_connections() {
        let file = TempDbFile::new();
        let db = Database::new(DbConfig::new(file.0.clone()).max_connections(8))
            .await
            .unwrap();
        let widget_id = add_product(&db, "Widget", 999, 10).await.id;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let sales = db.sales();
                tokio::spawn(async move { sales.process_sale(&[SaleLine::new(widget_id, 1)]).await })
            })
            .collect();

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(sale) => {
                    assert_eq!(sale.total_amount.cents(), 999);
                    sold += 1;
                }
                Err(DbError::Core(CoreError::InsufficientStock { available, .. })) => {
                    assert_eq!(available, 0);
                }
                Err(other) => panic!("unexpected sale error: {other}"),
            }
        }

        assert_eq!(sold, 10);
        assert_eq!(stock_of(&db, widget_id).await, 0);
        assert_eq!(db.sales().count().await.unwrap(), 10);
        assert_eq!(db.sales().total_revenue().await.unwrap().cents(), 9990);

        db.close().await;
    }

    #[tokio::test]
    async fn test_decrement_without_enough_stock_changes_nothing() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 999, 2).await;

        let mut tx = db.pool().begin().await.unwrap();
        let err = apply_decrement(
            &mut tx,
            &StockDecrement {
                product_id: widget.id,
                quantity: 5,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock {
                available: 2,
                requested: 5,
                ..
            })
        ));

        let err = apply_decrement(
            &mut tx,
            &StockDecrement {
                product_id: 404,
                quantity: 1,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(404))));

        apply_decrement(
            &mut tx,
            &StockDecrement {
                product_id: widget.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(stock_of(&db, widget.id).await, 2);
    }

    #[tokio::test]
    async fn test_revenue_past_i64_is_query_error() {
        let db = test_db().await;
        for _ in 0..2 {
            sqlx::query("INSERT INTO sales (sale_date, total_cents) VALUES (?1, ?2)")
                .bind(Utc::now())
                .bind(i64::MAX)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let err = db.sales().total_revenue().await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_price_change_leaves_history_alone() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 999, 5).await;

        let sale = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 2)])
            .await
            .unwrap();

        db.products()
            .update(
                widget.id,
                &ProductInput {
                    name: "Widget".to_string(),
                    description: String::new(),
                    price: Money::from_cents(1999),
                    stock_quantity: 3,
                },
            )
            .await
            .unwrap();

        let stored = db.sales().get(sale.id).await.unwrap();
        assert_eq!(stored.total_amount.cents(), 1998);
        assert_eq!(stored.items[0].price_at_sale.cents(), 999);
        assert_eq!(stored.items_total(), stored.total_amount);
    }

    #[tokio::test]
    async fn test_ledger_ordering_and_recent() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 100, 100).await;

        let mut ids = Vec::new();
        for qty in 1..=7 {
            let sale = db
                .sales()
                .process_sale(&[SaleLine::new(widget.id, qty)])
                .await
                .unwrap();
            ids.push(sale.id);
        }

        let all = db.sales().list().await.unwrap();
        let listed: Vec<i64> = all.iter().map(|s| s.id).collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(listed, expected);
        assert!(all.iter().all(|s| s.items.len() == 1));

        let recent = db.sales().recent(5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, expected[0]);
        assert!(recent.iter().all(|s| s.items.len() == 1));

        // 1 + 2 + ... + 7 units at $1.00
        assert_eq!(db.sales().total_revenue().await.unwrap().cents(), 2800);
    }

    #[tokio::test]
    async fn test_product_with_history_cannot_be_deleted() {
        let db = test_db().await;
        let widget = add_product(&db, "Widget", 999, 5).await;
        let sale = db
            .sales()
            .process_sale(&[SaleLine::new(widget.id, 1)])
            .await
            .unwrap();

        let err = db.products().delete(widget.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(
            err.to_string(),
            format!("Product {} has sales history and cannot be deleted", widget.id)
        );

        // Deleting the sale cascades to its items and frees the product
        db.sales().delete(sale.id).await.unwrap();
        assert!(matches!(
            db.sales().get(sale.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        db.products().delete(widget.id).await.unwrap();
    }
}
