use std::str::FromStr;

use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use tracing::debug;

use crate::etl::ETLError;

/// Opens the warehouse with a single pooled connection.
///
/// Foreign keys stay declared in the schema but SQLite does not enforce them
/// on insert; reference checks belong to the loader's
/// [`OrphanPolicy`](super::OrphanPolicy).
pub async fn connect(url: &str) -> Result<DatabaseConnection, ETLError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| ETLError::Connection(format!("invalid warehouse url '{}': {}", url, e)))?
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| ETLError::Connection(e.to_string()))?;

    debug!(url, "warehouse connection opened");
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}
