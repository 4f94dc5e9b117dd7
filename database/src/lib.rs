use autoreply_core::{AutoresponderStore, CoreError, StoreConfig};
use std::sync::Arc;

pub mod rest;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use rest::RestStore;
pub use sqlite::SqliteStore;

/// Opens the backend named in `config`. SQLite stores are migrated before use.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn AutoresponderStore>, CoreError> {
    match config {
        StoreConfig::Sqlite { database_url } => {
            let store = SqliteStore::connect(database_url).await?;
            store.run_migrations().await?;
            Ok(Arc::new(store))
        }
        StoreConfig::Rest {
            base_url,
            api_key,
            table,
        } => Ok(Arc::new(RestStore::new(base_url, api_key, table)?)),
    }
}
