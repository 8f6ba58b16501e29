use std::time::Duration;

use thiserror::Error;

use crate::domain::file::{File, FileMeta, NewFile};

pub mod driver;

/// Faults raised by a storage backend. Absence is never one of them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("inconsistent backend state: {0}")]
    Inconsistent(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Deduplicating file store keyed by content hash.
///
/// Implementations must make `insert_if_absent` a single atomic
/// conditional insert: when several callers race on the same hash exactly
/// one of them creates the record and all of them get the persisted
/// record back. Calls for different hashes must not serialize on each
/// other.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn lookup(&self, hash: &str) -> StoreResult<Option<File>>;

    /// Returns the persisted file and whether this call created it.
    async fn insert_if_absent(&self, file: NewFile) -> StoreResult<(File, bool)>;

    async fn stat(&self, hash: &str) -> StoreResult<Option<FileMeta>> {
        Ok(self.lookup(hash).await?.map(|file| file.meta()))
    }
}
