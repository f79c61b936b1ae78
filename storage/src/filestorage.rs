use std::{
    collections::BTreeMap,
    fs, io,
    io::Write,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;
use time::OffsetDateTime;

use crate::{CacheRecord, Clock, Storage, StorageError, SystemClock};

type Records = BTreeMap<String, serde_json::Value>;

/// Persistent backend keeping every record in one JSON file.
///
/// The file holds a single object mapping each key to a
/// `[unix_seconds, value]` pair. It is loaded by [`Storage::open`] and
/// rewritten in full on every write, through a temporary file renamed over
/// the original. Records that no longer decode read as absent.
pub struct FileStorage<V> {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    records: Mutex<Option<Records>>,
    _value: PhantomData<fn() -> V>,
}

#[derive(thiserror::Error, Debug)]
enum RecordError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("timestamp out of range :: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
}

impl<V> FileStorage<V> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            records: Mutex::new(None),
            _value: PhantomData,
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.records.lock().is_some()
    }
}

impl<V> Storage for FileStorage<V>
where
    V: Serialize + DeserializeOwned,
{
    type Value = V;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", fields(path = %self.path.display()), skip_all, err)
    )]
    fn open(&self) -> Result<(), StorageError> {
        let mut records = self.records.lock();
        if records.is_none() {
            let loaded = load(&self.path)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(records = loaded.len(), "storage opened");

            *records = Some(loaded);
        }
        Ok(())
    }

    fn close(&self) {
        if self.records.lock().take().is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!(path = %self.path.display(), "storage closed");
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", fields(%key), skip_all)
    )]
    fn get(&self, key: &str) -> Result<Option<CacheRecord<V>>, StorageError> {
        let records = self.records.lock();
        let records = records.as_ref().ok_or(StorageError::NotOpen)?;

        let Some(raw) = records.get(key) else {
            return Ok(None);
        };

        match decode(raw) {
            Ok(record) => Ok(Some(record)),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("unreadable record treated as missing :: {}", _err);

                Ok(None)
            }
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", fields(%key), skip_all)
    )]
    fn set(&self, key: &str, value: Option<V>) -> Result<(), StorageError> {
        let now = self.clock.now();
        let mut records = self.records.lock();
        let records = records.as_mut().ok_or(StorageError::NotOpen)?;

        let raw = encode(now, &value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;
        replace(&self.path, records, key, raw)
    }

    /// Reads and rewrites the record while holding the lock, so a concurrent
    /// `set` is never undone.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", fields(%key), skip_all)
    )]
    fn mark_updated(&self, key: &str) -> Result<(), StorageError> {
        let now = self.clock.now();
        let mut records = self.records.lock();
        let records = records.as_mut().ok_or(StorageError::NotOpen)?;

        let value = records
            .get(key)
            .and_then(|raw| decode::<V>(raw).ok())
            .and_then(|record| record.value);

        #[cfg(feature = "tracing")]
        if value.is_none() {
            tracing::debug!("no stored value; writing an empty record");
        }

        let raw = encode(now, &value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;
        replace(&self.path, records, key, raw)
    }
}

/// Inserts `raw` and persists, restoring the previous record if the write fails.
fn replace(
    path: &Path,
    records: &mut Records,
    key: &str,
    raw: serde_json::Value,
) -> Result<(), StorageError> {
    let previous = records.insert(key.to_owned(), raw);
    if let Err(err) = persist(path, records) {
        match previous {
            Some(previous) => records.insert(key.to_owned(), previous),
            None => records.remove(key),
        };
        return Err(err);
    }
    Ok(())
}

fn load(path: &Path) -> Result<Records, StorageError> {
    match fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(Records::new()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: path.to_owned(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Records::new()),
        Err(e) => Err(e.into()),
    }
}

fn persist(path: &Path, records: &Records) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut file, records).map_err(io::Error::from)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn encode<V: Serialize>(
    updated_at: OffsetDateTime,
    value: &Option<V>,
) -> Result<serde_json::Value, serde_json::Error> {
    let seconds = updated_at.unix_timestamp_nanos() as f64 / 1e9;
    serde_json::to_value((seconds, value))
}

fn decode<V: DeserializeOwned>(raw: &serde_json::Value) -> Result<CacheRecord<V>, RecordError> {
    let (seconds, value): (f64, Option<V>) = serde_json::from_value(raw.clone())?;
    let updated_at = OffsetDateTime::from_unix_timestamp_nanos((seconds * 1e9) as i128)?;
    Ok(CacheRecord::new(updated_at, value))
}
