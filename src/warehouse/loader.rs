use std::collections::HashSet;

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set};
use tracing::{info, warn};

use super::config::{LoadConfig, OrphanPolicy};
use super::entities::{customers, products, sales};
use crate::etl::ETLError;

/// Typed rows for one load run, already mapped to warehouse columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarehouseRows {
    pub customers: Vec<customers::Model>,
    pub products: Vec<products::Model>,
    pub sales: Vec<sales::Model>,
}

impl WarehouseRows {
    /// Sales whose customer or product key is not among the rows being
    /// loaded. Null references are not counted.
    pub fn orphan_sales(&self) -> usize {
        let customer_ids: HashSet<&str> = self
            .customers
            .iter()
            .map(|c| c.customer_id.as_str())
            .collect();
        let product_ids: HashSet<&str> = self
            .products
            .iter()
            .map(|p| p.product_id.as_str())
            .collect();

        self.sales
            .iter()
            .filter(|s| {
                let missing_customer = s
                    .customer_id
                    .as_deref()
                    .is_some_and(|id| !customer_ids.contains(id));
                let missing_product = s
                    .product_id
                    .as_deref()
                    .is_some_and(|id| !product_ids.contains(id));
                missing_customer || missing_product
            })
            .count()
    }
}

/// Rows written per table by one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub customers: u64,
    pub products: u64,
    pub sales: u64,
    pub orphan_sales: usize,
}

/// Appends mapped rows into the warehouse tables.
///
/// Tables are filled customers, then products, then sales, so every sale is
/// inserted after the rows its foreign keys point at.
pub struct WarehouseLoader {
    config: LoadConfig,
}

impl WarehouseLoader {
    pub fn new(config: LoadConfig) -> Self {
        WarehouseLoader { config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub async fn load<C>(&self, conn: &C, rows: WarehouseRows) -> Result<LoadSummary, ETLError>
    where
        C: ConnectionTrait,
    {
        let orphan_sales = rows.orphan_sales();
        if orphan_sales > 0 {
            match self.config.orphan_policy() {
                OrphanPolicy::Reject => {
                    return Err(ETLError::ReferentialIntegrity {
                        orphans: orphan_sales,
                    });
                }
                OrphanPolicy::Warn => warn!(
                    orphans = orphan_sales,
                    "sales reference customers or products that are not loaded"
                ),
            }
        }

        let batch_size = self.config.batch_size().max(1);

        info!(rows = rows.customers.len(), "inserting customers");
        let customers = insert_batches(
            conn,
            rows.customers.into_iter().map(customer_model).collect(),
            batch_size,
        )
        .await
        .map_err(|e| with_table("customers", e))?;

        info!(rows = rows.products.len(), "inserting products");
        let products = insert_batches(
            conn,
            rows.products.into_iter().map(product_model).collect(),
            batch_size,
        )
        .await
        .map_err(|e| with_table("products", e))?;

        info!(rows = rows.sales.len(), "inserting sales");
        let sales = insert_batches(
            conn,
            rows.sales.into_iter().map(sale_model).collect(),
            batch_size,
        )
        .await
        .map_err(|e| with_table("sales", e))?;

        Ok(LoadSummary {
            customers,
            products,
            sales,
            orphan_sales,
        })
    }
}

impl Default for WarehouseLoader {
    fn default() -> Self {
        WarehouseLoader::new(LoadConfig::default())
    }
}

fn with_table(table: &str, err: sea_orm::DbErr) -> ETLError {
    ETLError::Database(sea_orm::DbErr::Custom(format!(
        "failed to insert into {}: {}",
        table, err
    )))
}

async fn insert_batches<A, C>(
    conn: &C,
    models: Vec<A>,
    batch_size: usize,
) -> Result<u64, sea_orm::DbErr>
where
    A: ActiveModelTrait + Send + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let mut inserted = 0;
    let mut models = models.into_iter().peekable();
    while models.peek().is_some() {
        let batch: Vec<A> = models.by_ref().take(batch_size).collect();
        inserted += <A::Entity as EntityTrait>::insert_many(batch)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(inserted)
}

fn customer_model(c: customers::Model) -> customers::ActiveModel {
    customers::ActiveModel {
        customer_id: Set(c.customer_id),
        name: Set(c.name),
        region: Set(c.region),
        join_date: Set(c.join_date),
        age: Set(c.age),
        subscription_status: Set(c.subscription_status),
    }
}

fn product_model(p: products::Model) -> products::ActiveModel {
    products::ActiveModel {
        product_id: Set(p.product_id),
        product_name: Set(p.product_name),
        category: Set(p.category),
        unit_price: Set(p.unit_price),
        manufacture_year: Set(p.manufacture_year),
        availability_status: Set(p.availability_status),
    }
}

fn sale_model(s: sales::Model) -> sales::ActiveModel {
    sales::ActiveModel {
        sale_id: Set(s.sale_id),
        sale_date: Set(s.sale_date),
        customer_id: Set(s.customer_id),
        product_id: Set(s.product_id),
        store_id: Set(s.store_id),
        campaign_id: Set(s.campaign_id),
        quantity: Set(s.quantity),
        sales_amount: Set(s.sales_amount),
        discount_amount: Set(s.discount_amount),
        state: Set(s.state),
    }
}
