use sea_orm_migration::prelude::*;
use tracing::info;

/// Creates and resets the warehouse tables.
///
/// Every load run calls [`WarehouseSchema::reset`], which drops all three
/// tables before recreating them, so nothing from a previous run survives.
pub struct WarehouseSchema;

impl WarehouseSchema {
    /// Ensures `customers`, `products` and `sales` exist. Existing tables are
    /// left untouched.
    pub async fn create_schema(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::CustomerId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string())
                    .col(ColumnDef::new(Customers::Region).string())
                    .col(ColumnDef::new(Customers::JoinDate).string())
                    .col(ColumnDef::new(Customers::Age).integer())
                    .col(ColumnDef::new(Customers::SubscriptionStatus).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::ProductId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::ProductName).string())
                    .col(ColumnDef::new(Products::Category).string())
                    .col(ColumnDef::new(Products::UnitPrice).double())
                    .col(ColumnDef::new(Products::ManufactureYear).integer())
                    .col(ColumnDef::new(Products::AvailabilityStatus).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sales::SaleId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sales::SaleDate).string())
                    .col(ColumnDef::new(Sales::CustomerId).string())
                    .col(ColumnDef::new(Sales::ProductId).string())
                    .col(ColumnDef::new(Sales::StoreId).string())
                    .col(ColumnDef::new(Sales::CampaignId).string())
                    .col(ColumnDef::new(Sales::Quantity).integer())
                    .col(ColumnDef::new(Sales::SalesAmount).double())
                    .col(ColumnDef::new(Sales::DiscountAmount).double())
                    .col(ColumnDef::new(Sales::State).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_customer_id")
                            .from(Sales::Table, Sales::CustomerId)
                            .to(Customers::Table, Customers::CustomerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_product_id")
                            .from(Sales::Table, Sales::ProductId)
                            .to(Products::Table, Products::ProductId),
                    )
                    .to_owned(),
            )
            .await?;

        info!("warehouse schema created");
        Ok(())
    }

    /// Drops all three tables. Tables that do not exist are skipped.
    pub async fn reset_all(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // sales references the other two, so it goes first
        manager
            .drop_table(Table::drop().table(Sales::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await?;

        info!("existing warehouse tables dropped");
        Ok(())
    }

    /// Clean-slate reset: [`reset_all`](Self::reset_all) followed by
    /// [`create_schema`](Self::create_schema).
    pub async fn reset(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        Self::reset_all(manager).await?;
        Self::create_schema(manager).await
    }
}

#[derive(DeriveIden)]
pub enum Customers {
    Table,
    CustomerId,
    Name,
    Region,
    JoinDate,
    Age,
    SubscriptionStatus,
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    ProductId,
    ProductName,
    Category,
    UnitPrice,
    ManufactureYear,
    AvailabilityStatus,
}

#[derive(DeriveIden)]
pub enum Sales {
    Table,
    SaleId,
    SaleDate,
    CustomerId,
    ProductId,
    StoreId,
    CampaignId,
    Quantity,
    SalesAmount,
    DiscountAmount,
    State,
}
