//! # Product Repository
//!
//! The catalog store: product CRUD plus the stock-level filters used by the
//! sales-entry screen and the dashboard.
//!
//! ## Stock Filters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  list()                 every product, by name        /inventory        │
//! │  list_available()       stock_quantity > 0, by name   /sales            │
//! │  list_low_stock(10)     stock_quantity < 10, by name  dashboard         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is only ever decremented by the sale processor
//! ([`crate::repository::sale`]); here it is overwritten wholesale by
//! [`ProductRepository::update`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::PRODUCT_COLUMNS;
use crate::error::{DbError, DbResult};
use shopkeep_core::{Product, ProductInput};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let all = repo.list().await?;
/// let product = repo.get(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists products with stock on hand (`stock_quantity > 0`), ordered by name.
    pub async fn list_available(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock_quantity > 0 ORDER BY name, id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists products with `stock_quantity < threshold`, ordered by name.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock_quantity < ?1 ORDER BY name, id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        debug!(threshold, count = products.len(), "Listed low-stock products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its ID, failing with [`DbError::NotFound`] if absent.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The stored product with its generated id and creation time.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(name = %input.name, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, price_cents, stock_quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Product inserted");

        Ok(Product {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            stock_quantity: input.stock_quantity,
            created_at: now,
        })
    }

    /// Overwrites name, description, price and stock of an existing product.
    ///
    /// `created_at` is never changed.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product as stored after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        debug!(id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock_quantity = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Deletes a product.
    ///
    /// Products referenced by recorded sale items cannot be deleted; the
    /// foreign key restricts it and the error says so.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Product has sales history
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: format!("Product {id} has sales history and cannot be deleted"),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts products with `stock_quantity < threshold`.
    pub async fn count_low_stock(&self, threshold: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock_quantity < ?1")
                .bind(threshold)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use shopkeep_core::{Money, ProductInput, LOW_STOCK_THRESHOLD};

    use super::*;

    fn input(name: &str, cents: i64, stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: String::new(),
            price: Money::from_cents(cents),
            stock_quantity: stock,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&input("Widget", 999, 5)).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.price.cents(), 999);
        assert_eq!(fetched.description, "");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = test_db().await;

        let err = db.products().get(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.products().find(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_filters_stock() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&input("Zebra Cake", 100, 0)).await.unwrap();
        repo.create(&input("Apple", 50, 25)).await.unwrap();
        repo.create(&input("Milk", 200, 3)).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["Apple", "Milk", "Zebra Cake"]);

        let available: Vec<String> = repo
            .list_available()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(available, ["Apple", "Milk"]);

        let low: Vec<String> = repo
            .list_low_stock(LOW_STOCK_THRESHOLD)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(low, ["Milk", "Zebra Cake"]);

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.count_low_stock(LOW_STOCK_THRESHOLD).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&input("Widget", 999, 5)).await.unwrap();

        let mut changes = input("Widget Pro", 1499, 12);
        changes.description = "Now with more widget".to_string();
        let updated = repo.update(created.id, &changes).await.unwrap();

        assert_eq!(updated.name, "Widget Pro");
        assert_eq!(updated.description, "Now with more widget");
        assert_eq!(updated.price.cents(), 1499);
        assert_eq!(updated.stock_quantity, 12);
        assert_eq!(updated.created_at, created.created_at);

        let err = repo.update(999, &changes).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&input("Widget", 999, 5)).await.unwrap();
        repo.delete(created.id).await.unwrap();

        assert!(repo.find(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
