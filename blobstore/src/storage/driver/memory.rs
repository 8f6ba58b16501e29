use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;

use crate::domain::file::{File, NewFile};
use crate::storage::{FileStore, StoreResult};

const SHARDS: usize = 256;

/// In-process store for local runs and tests.
///
/// Files are spread over independently locked shards by the first byte of
/// their hash. Writers only wait on each other when their hashes share that
/// byte.
pub struct MemoryFileStore {
    shards: Vec<RwLock<HashMap<String, File>>>,
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARDS).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard_index(hash: &str) -> usize {
        hash.get(..2)
            .and_then(|byte| u8::from_str_radix(byte, 16).ok())
            .map_or(0, usize::from)
    }

    fn shard(&self, hash: &str) -> &RwLock<HashMap<String, File>> {
        &self.shards[Self::shard_index(hash)]
    }

    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl FileStore for MemoryFileStore {
    async fn lookup(&self, hash: &str) -> StoreResult<Option<File>> {
        Ok(self.shard(hash).read().await.get(hash).cloned())
    }

    async fn insert_if_absent(&self, file: NewFile) -> StoreResult<(File, bool)> {
        let mut shard = self.shard(&file.hash).write().await;
        match shard.entry(file.hash.clone()) {
            Entry::Occupied(existing) => Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => Ok((slot.insert(file.into_file()).clone(), true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::digest::content_address;
    use std::sync::Arc;

    fn upload(data: &[u8], who: &str) -> NewFile {
        NewFile::new(content_address(data), "application/x-tar", who, data.to_vec())
    }

    #[tokio::test]
    async fn test_insert_then_lookup() {
        let store = MemoryFileStore::new();
        assert!(store.is_empty().await);

        let (file, created) = store.insert_if_absent(upload(b"hello", "alice")).await.unwrap();
        assert!(created);

        let found = store.lookup(&file.hash).await.unwrap().unwrap();
        assert_eq!(found, file);
        let meta = store.stat(&file.hash).await.unwrap().unwrap();
        assert_eq!(meta.size, 5);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_original_metadata() {
        let store = MemoryFileStore::new();
        let (first, _) = store.insert_if_absent(upload(b"same bytes", "alice")).await.unwrap();

        let mut retry = upload(b"same bytes", "bob");
        retry.mimetype = "application/zip".to_string();
        let (second, created) = store.insert_if_absent(retry).await.unwrap();

        assert!(!created);
        assert_eq!(second.created_by, "alice");
        assert_eq!(second.mimetype, "application/x-tar");
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_content_lands_in_distinct_records() {
        let store = MemoryFileStore::new();
        for i in 0..64u32 {
            let (_, created) = store
                .insert_if_absent(upload(&i.to_le_bytes(), "alice"))
                .await
                .unwrap();
            assert!(created);
        }
        assert_eq!(store.len().await, 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_have_one_creator() {
        let store = Arc::new(MemoryFileStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_if_absent(upload(b"contended", &format!("user-{i}"))).await
            }));
        }

        let mut creators = 0;
        let mut hashes = Vec::new();
        for handle in handles {
            let (file, created) = handle.await.unwrap().unwrap();
            creators += created as usize;
            hashes.push(file.hash);
        }
        assert_eq!(creators, 1);
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_shard_index_follows_first_byte() {
        let low = format!("0a{}", "0".repeat(62));
        let high = format!("0b{}", "0".repeat(62));
        assert_ne!(MemoryFileStore::shard_index(&low), MemoryFileStore::shard_index(&high));
        assert_eq!(MemoryFileStore::shard_index(&format!("ff{}", "1".repeat(62))), 255);
        assert_eq!(MemoryFileStore::shard_index("z"), 0);
    }

    #[tokio::test]
    async fn test_write_guard_does_not_block_other_shards() {
        let store = MemoryFileStore::new();
        let held = format!("0a{}", "0".repeat(62));
        let other = format!("0b{}", "0".repeat(62));

        let _guard = store.shard(&held).write().await;
        let upload = NewFile::new(other.clone(), "application/x-tar", "alice", b"other".to_vec());
        let (_, created) = tokio::time::timeout(std::time::Duration::from_secs(1), store.insert_if_absent(upload))
            .await
            .expect("insert into an unrelated shard waited on a held lock")
            .unwrap();
        assert!(created);
    }
}
