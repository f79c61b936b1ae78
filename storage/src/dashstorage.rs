use std::sync::Arc;

use dashmap::DashMap;

use crate::{CacheRecord, Clock, Storage, StorageError, SystemClock};

/// In-memory backend. Nothing survives the process.
pub struct DashStorage<V> {
    records: DashMap<String, CacheRecord<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> Storage for DashStorage<V>
where
    V: Clone,
{
    type Value = V;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", fields(%key), skip_all)
    )]
    fn get(&self, key: &str) -> Result<Option<CacheRecord<V>>, StorageError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", fields(%key), skip_all)
    )]
    fn set(&self, key: &str, value: Option<V>) -> Result<(), StorageError> {
        self.records
            .insert(key.to_owned(), CacheRecord::new(self.clock.now(), value));
        Ok(())
    }

    /// Re-stamps under the shard lock, so a concurrent `set` is never undone.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", fields(%key), skip_all)
    )]
    fn mark_updated(&self, key: &str) -> Result<(), StorageError> {
        let now = self.clock.now();
        self.records
            .entry(key.to_owned())
            .and_modify(|record| record.updated_at = now)
            .or_insert_with(|| CacheRecord::new(now, None));
        Ok(())
    }
}

impl<V> DashStorage<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V> Default for DashStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}
