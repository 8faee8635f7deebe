//! # Dashboard Repository
//!
//! Read-only aggregation over the catalog and the ledger.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use shopkeep_core::{DashboardSummary, LOW_STOCK_THRESHOLD, RECENT_SALES_LIMIT};

/// Computes the dashboard figures.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Builds the summary shown on `/` and returned by `/api/dashboard`.
    ///
    /// Each figure is its own query; the figures are not taken from a
    /// single snapshot.
    pub async fn summary(&self) -> DbResult<DashboardSummary> {
        let products = ProductRepository::new(self.pool.clone());
        let sales = SaleRepository::new(self.pool.clone());

        let summary = DashboardSummary {
            total_products: products.count().await?,
            total_sales: sales.count().await?,
            low_stock_products: products.count_low_stock(LOW_STOCK_THRESHOLD).await?,
            recent_sales: sales.recent(RECENT_SALES_LIMIT).await?,
            total_revenue: sales.total_revenue().await?,
        };

        debug!(
            total_products = summary.total_products,
            total_sales = summary.total_sales,
            "Dashboard summary computed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use shopkeep_core::{Money, ProductInput, SaleLine};

    #[tokio::test]
    async fn test_empty_dashboard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let summary = db.dashboard().summary().await.unwrap();

        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.total_sales, 0);
        assert_eq!(summary.low_stock_products, 0);
        assert!(summary.recent_sales.is_empty());
        assert_eq!(summary.total_revenue, Money::zero());
    }

    #[tokio::test]
    async fn test_dashboard_figures() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut ids = Vec::new();
        for (name, stock) in [("Apple", 50), ("Bread", 9), ("Cheese", 10)] {
            let product = db
                .products()
                .create(&ProductInput {
                    name: name.to_string(),
                    description: String::new(),
                    price: Money::from_cents(250),
                    stock_quantity: stock,
                })
                .await
                .unwrap();
            ids.push(product.id);
        }

        for _ in 0..6 {
            db.sales()
                .process_sale(&[SaleLine::new(ids[0], 1)])
                .await
                .unwrap();
        }

        let summary = db.dashboard().summary().await.unwrap();
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_sales, 6);
        // Bread (9) only; Cheese sits exactly on the threshold
        assert_eq!(summary.low_stock_products, 1);
        assert_eq!(summary.recent_sales.len(), 5);
        assert_eq!(summary.total_revenue.cents(), 1500);
    }
}
