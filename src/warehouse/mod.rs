pub mod config;
pub mod connection;
pub mod entities;
pub mod loader;
pub mod mapping;
pub mod schema;

pub use config::{LoadConfig, LoadConfigBuilder, OrphanPolicy};
pub use connection::connect;
pub use entities::{customers, products, sales};
pub use loader::{LoadSummary, WarehouseLoader, WarehouseRows};
pub use mapping::{
    CUSTOMER_COLUMNS, ColumnMap, ColumnMapping, PRODUCT_COLUMNS, SALE_COLUMNS, customer_rows,
    product_rows, sale_rows,
};
pub use schema::WarehouseSchema;
