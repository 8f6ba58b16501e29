use crate::config::Config;
use crate::service::reader::BoundedReader;
use crate::storage::driver::{memory::MemoryFileStore, sqlite::SqliteFileStore};
use crate::storage::{FileStore, StoreError, StoreResult};
use std::future::Future;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FileStore>,
    pub reader: BoundedReader,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn FileStore>) -> Self {
        let reader = BoundedReader::new(config.max_upload_bytes, config.accepted_mimetypes.clone());
        AppState {
            store,
            reader,
            config: Arc::new(config),
        }
    }

    /// Build the state with the backend selected by `config.storage_typ`.
    pub async fn from_config(config: Config) -> StoreResult<Self> {
        let store: Arc<dyn FileStore> = match config.storage_typ.as_str() {
            "MEMORY" => Arc::new(MemoryFileStore::new()),
            _ => Arc::new(SqliteFileStore::open(&config.db_url, config.db_max_connections).await?),
        };
        Ok(Self::new(config, store))
    }

    /// Run a backend call under the configured timeout.
    pub async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        let limit = self.config.backend_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| StoreError::Timeout(limit))?
    }
}
