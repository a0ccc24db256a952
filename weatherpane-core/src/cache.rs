//! Persisted last-known location.
//!
//! The cache is advisory: callers go through [`LocationCache::read`] and
//! [`LocationCache::write`], which log failures and carry on. Concrete stores
//! only implement the fallible `try_*` primitives.

use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{error::WeatherError, model::LocationRecord};

/// Logical key the record is stored under.
pub const DEFAULT_KEY: &str = "info";

#[async_trait]
pub trait LocationCache: Send + Sync + Debug {
    async fn try_read(&self) -> Result<Option<LocationRecord>, WeatherError>;

    async fn try_write(&self, record: &LocationRecord) -> Result<(), WeatherError>;

    /// Last stored record, or `None` if there is none or it can't be read.
    async fn read(&self) -> Option<LocationRecord> {
        match self.try_read().await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable location cache");
                None
            }
        }
    }

    /// Best-effort store; failures are logged, never returned.
    async fn write(&self, record: &LocationRecord) {
        if let Err(err) = self.try_write(record).await {
            warn!(error = %err, city = %record.city, "failed to persist location");
        }
    }
}

/// Stores the record as a single JSON file named after its key.
#[derive(Debug, Clone)]
pub struct FileLocationCache {
    path: PathBuf,
}

impl FileLocationCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, DEFAULT_KEY)
    }

    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, err: impl std::fmt::Display) -> WeatherError {
        WeatherError::CacheWriteFailed(format!("{}: {err}", self.path.display()))
    }
}

#[async_trait]
impl LocationCache for FileLocationCache {
    async fn try_read(&self) -> Result<Option<LocationRecord>, WeatherError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cached location yet");
                return Ok(None);
            }
            Err(err) => {
                return Err(WeatherError::CacheReadFailed(format!(
                    "{}: {err}",
                    self.path.display()
                )));
            }
        };

        // An explicit `null` counts as "nothing stored".
        serde_json::from_str::<Option<LocationRecord>>(&contents).map_err(|err| {
            WeatherError::CacheReadFailed(format!("{}: {err}", self.path.display()))
        })
    }

    async fn try_write(&self, record: &LocationRecord) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.write_error(err))?;
        }

        let json = serde_json::to_string(record).map_err(|err| self.write_error(err))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|err| self.write_error(err))?;

        debug!(path = %self.path.display(), city = %record.city, "location cached");
        Ok(())
    }
}

/// In-process store. Useful for embedding and for tests.
#[derive(Debug, Default)]
pub struct MemoryLocationCache {
    record: Mutex<Option<LocationRecord>>,
    writes: AtomicUsize,
}

impl MemoryLocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: LocationRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<LocationRecord> {
        self.record.lock().clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationCache for MemoryLocationCache {
    async fn try_read(&self) -> Result<Option<LocationRecord>, WeatherError> {
        Ok(self.record.lock().clone())
    }

    async fn try_write(&self, record: &LocationRecord) -> Result<(), WeatherError> {
        *self.record.lock() = Some(record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl<T: LocationCache + ?Sized> LocationCache for std::sync::Arc<T> {
    async fn try_read(&self) -> Result<Option<LocationRecord>, WeatherError> {
        (**self).try_read().await
    }

    async fn try_write(&self, record: &LocationRecord) -> Result<(), WeatherError> {
        (**self).try_write(record).await
    }
}
