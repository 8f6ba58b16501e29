use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::domain::file::{File, FileMeta, NewFile};
use crate::storage::{FileStore, StoreError, StoreResult};

const FILE_COLUMNS: &str = "hash, mimetype, created_by, created_at, data";

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable store backed by a single SQLite table keyed by hash.
#[derive(Debug, Clone)]
pub struct SqliteFileStore {
    pool: Arc<SqlitePool>,
}

impl SqliteFileStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Open the database named by `url`, creating the file if needed.
    ///
    /// An in-memory database lives only as long as its connection, so such
    /// URLs get a pool pinned to one connection that is never reaped.
    pub async fn open(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        if is_in_memory(url) {
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            Self::connect_with(pool_options, options).await
        } else {
            Self::connect(options, max_connections).await
        }
    }

    /// Open a pool for `options` and bring the schema up to date.
    pub async fn connect(options: SqliteConnectOptions, max_connections: u32) -> StoreResult<Self> {
        Self::connect_with(SqlitePoolOptions::new().max_connections(max_connections), options).await
    }

    pub async fn connect_with(pool_options: SqlitePoolOptions, options: SqliteConnectOptions) -> StoreResult<Self> {
        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(Arc::new(pool));
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait::async_trait]
impl FileStore for SqliteFileStore {
    async fn lookup(&self, hash: &str) -> StoreResult<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE hash = ?"))
            .bind(hash)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(file)
    }

    async fn insert_if_absent(&self, file: NewFile) -> StoreResult<(File, bool)> {
        let hash = file.hash.clone();
        let file = file.into_file();

        // The primary key arbitrates concurrent writers; losers get no row back.
        let inserted = sqlx::query_as::<_, File>(&format!(
            "INSERT INTO files ({FILE_COLUMNS}) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(hash) DO NOTHING RETURNING {FILE_COLUMNS}"
        ))
        .bind(&file.hash)
        .bind(&file.mimetype)
        .bind(&file.created_by)
        .bind(file.created_at)
        .bind(&file.data)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if let Some(created) = inserted {
            return Ok((created, true));
        }

        let existing = self.lookup(&hash).await?.ok_or_else(|| {
            StoreError::Inconsistent(format!("file {hash} conflicted on insert but cannot be read back"))
        })?;
        Ok((existing, false))
    }

    async fn stat(&self, hash: &str) -> StoreResult<Option<FileMeta>> {
        let meta = sqlx::query_as::<_, FileMeta>(
            "SELECT hash, mimetype, created_by, created_at, length(data) AS size FROM files WHERE hash = ?",
        )
        .bind(hash)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(meta)
    }
}
