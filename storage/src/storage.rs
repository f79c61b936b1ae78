use std::{ops::Deref, sync::Arc};

use crate::{CacheRecord, StorageError};

/// Backing store for cached feeds, keyed by source url.
///
/// Backends implement `get` and `set`. Every call takes `&self`, so a
/// backend shared between threads serializes its own calls, including the
/// read-modify-write inside `mark_updated`.
pub trait Storage {
    type Value;

    /// Acquires whatever the backend needs (a file, a connection).
    /// Calling it on an already open backend does nothing.
    fn open(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Releases what `open` acquired. Safe to call more than once.
    fn close(&self) {}

    /// Returns `None` when nothing was ever stored for `key`.
    fn get(&self, key: &str) -> Result<Option<CacheRecord<Self::Value>>, StorageError>;

    /// Stores `value` stamped with the current time, replacing any
    /// previous record for `key`.
    fn set(&self, key: &str, value: Option<Self::Value>) -> Result<(), StorageError>;

    /// Re-stamps the stored value with the current time without changing it.
    ///
    /// The default reads and writes in two calls, so a `set` landing in
    /// between is overwritten. Shared backends override it to do both under
    /// one lock.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", fields(%key), skip_all)
    )]
    fn mark_updated(&self, key: &str) -> Result<(), StorageError> {
        let existing = self.get(key)?.and_then(|record| record.value);

        #[cfg(feature = "tracing")]
        if existing.is_none() {
            tracing::debug!("no stored value; writing an empty record");
        }

        self.set(key, existing)
    }

    /// Opens the backend and returns a guard that closes it when dropped.
    fn scoped(&self) -> Result<Opened<'_, Self>, StorageError>
    where
        Self: Sized,
    {
        self.open()?;
        Ok(Opened { storage: self })
    }
}

/// An open backend. Closes it on drop.
pub struct Opened<'s, S: Storage> {
    storage: &'s S,
}

impl<S: Storage> Deref for Opened<'_, S> {
    type Target = S;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.storage
    }
}

impl<S: Storage> Drop for Opened<'_, S> {
    fn drop(&mut self) {
        self.storage.close();
    }
}

impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    type Value = S::Value;

    fn open(&self) -> Result<(), StorageError> {
        (**self).open()
    }

    fn close(&self) {
        (**self).close()
    }

    fn get(&self, key: &str) -> Result<Option<CacheRecord<Self::Value>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Option<Self::Value>) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn mark_updated(&self, key: &str) -> Result<(), StorageError> {
        (**self).mark_updated(key)
    }
}

impl<S> Storage for &S
where
    S: Storage + ?Sized,
{
    type Value = S::Value;

    fn open(&self) -> Result<(), StorageError> {
        (**self).open()
    }

    fn close(&self) {
        (**self).close()
    }

    fn get(&self, key: &str) -> Result<Option<CacheRecord<Self::Value>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Option<Self::Value>) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn mark_updated(&self, key: &str) -> Result<(), StorageError> {
        (**self).mark_updated(key)
    }
}
