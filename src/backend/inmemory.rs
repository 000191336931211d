//! In-memory record store (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding. Each record
//! remembers the order in which it was first inserted so that collection
//! scans come back in creation order, the way the dashboard lists them.

use super::StoreBackend;
use crate::error::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stored record with its insertion position.
struct StoredRecord {
    seq: u64,
    data: Vec<u8>,
}

/// Thread-safe async in-memory record store.
///
/// Cloning is cheap and every clone shares the same records, so one backend
/// can be injected into all services of a [`Workspace`](crate::Workspace).
///
/// # Example
///
/// ```no_run
/// use taskdesk::backend::{InMemoryBackend, StoreBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///
///     backend.put("task:1", b"encoded".to_vec()).await?;
///     assert!(backend.get("task:1").await?.is_some());
///
///     assert_eq!(backend.next_sequence("invoice_number:2026").await?, 1);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryBackend {
    records: Arc<DashMap<String, StoredRecord>>,
    sequences: Arc<DashMap<String, u64>>,
    insertion: Arc<AtomicU64>,
}

impl InMemoryBackend {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryBackend {
            records: Arc::new(DashMap::new()),
            sequences: Arc::new(DashMap::new()),
            insertion: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get memory statistics.
    pub async fn stats(&self) -> StoreStats {
        let total_bytes: usize = self.records.iter().map(|entry| entry.data.len()).sum();

        StoreStats {
            total_records: self.records.len(),
            total_sequences: self.sequences.len(),
            total_bytes,
        }
    }

    /// Print store statistics to debug log.
    pub async fn log_stats(&self) {
        let stats = self.stats().await;
        debug!(
            "Store Stats: {} records, {} sequences, {} bytes",
            stats.total_records, stats.total_sequences, stats.total_bytes
        );
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let found = self.records.get(key).map(|record| record.data.clone());
        debug!(
            "✓ InMemory GET {} -> {}",
            key,
            if found.is_some() { "HIT" } else { "MISS" }
        );
        Ok(found)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        match self.records.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().data = value;
                debug!("✓ InMemory PUT {} (replace)", key);
            }
            Entry::Vacant(entry) => {
                let seq = self.insertion.fetch_add(1, Ordering::Relaxed);
                entry.insert(StoredRecord { seq, data: value });
                debug!("✓ InMemory PUT {} (insert #{})", key, seq);
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let existed = self.records.remove(key).is_some();
        debug!("✓ InMemory DELETE {} (existed: {})", key, existed);
        Ok(existed)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<Vec<u8>>> {
        let mut matched: Vec<(u64, Vec<u8>)> = self
            .records
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.seq, entry.data.clone()))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);

        debug!("✓ InMemory SCAN {}* -> {} records", prefix, matched.len());
        Ok(matched.into_iter().map(|(_, data)| data).collect())
    }

    async fn next_sequence(&self, name: &str) -> Result<u64> {
        let mut counter = self.sequences.entry(name.to_string()).or_insert(0);
        *counter += 1;
        let value = *counter;
        debug!("✓ InMemory SEQ {} -> {}", name, value);
        Ok(value)
    }

    async fn advance_sequence(&self, name: &str, floor: u64) -> Result<()> {
        let mut counter = self.sequences.entry(name.to_string()).or_insert(0);
        if *counter < floor {
            *counter = floor;
        }
        Ok(())
    }

    async fn update<F>(&self, key: &str, apply: F) -> Result<bool>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>> + Send,
    {
        // The shard stays write-locked until the new bytes are in place.
        match self.records.get_mut(key) {
            Some(mut record) => {
                let next = apply(&record.data)?;
                record.data = next;
                debug!("✓ InMemory UPDATE {}", key);
                Ok(true)
            }
            None => {
                debug!("✓ InMemory UPDATE {} -> MISS", key);
                Ok(false)
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.records.contains_key(key))
    }
}

/// Store statistics.
#[derive(Clone, Debug)]
pub struct StoreStats {
    pub total_records: usize,
    pub total_sequences: usize,
    pub total_bytes: usize,
}
