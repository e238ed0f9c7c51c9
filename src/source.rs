//! Loading record snapshots and caching them outside the computation core.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::Result;
use crate::ingest::read_records_from_path;
use crate::models::Record;

pub trait RecordSource {
    fn load(&self) -> Result<Vec<Record>>;
}

#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvFileSource {
    fn load(&self) -> Result<Vec<Record>> {
        read_records_from_path(&self.path)
    }
}

struct Snapshot {
    loaded_at: Instant,
    records: Arc<[Record]>,
}

/// Memoizes another source. Snapshots expire after `ttl` when one is set,
/// otherwise only on [`CachedSource::refresh`] or [`CachedSource::invalidate`].
pub struct CachedSource<S> {
    inner: S,
    ttl: Option<Duration>,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<S: RecordSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ttl: None,
            snapshot: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        match self.ttl {
            Some(ttl) => snapshot.loaded_at.elapsed() < ttl,
            None => true,
        }
    }

    /// Current snapshot, loading it when absent or expired.
    pub fn records(&self) -> Result<Arc<[Record]>> {
        let mut guard = self.lock();
        if let Some(snapshot) = guard.as_ref() {
            if self.is_fresh(snapshot) {
                debug!(rows = snapshot.records.len(), "serving cached records");
                return Ok(Arc::clone(&snapshot.records));
            }
            info!("cached records expired, reloading");
        }
        self.reload(&mut guard)
    }

    /// Reloads now. On failure the previous snapshot stays in place.
    pub fn refresh(&self) -> Result<Arc<[Record]>> {
        let mut guard = self.lock();
        self.reload(&mut guard)
    }

    pub fn invalidate(&self) {
        self.lock().take();
    }

    fn reload(&self, guard: &mut MutexGuard<'_, Option<Snapshot>>) -> Result<Arc<[Record]>> {
        let records: Arc<[Record]> = self.inner.load()?.into();
        **guard = Some(Snapshot {
            loaded_at: Instant::now(),
            records: Arc::clone(&records),
        });
        Ok(records)
    }
}

impl<S: RecordSource> RecordSource for CachedSource<S> {
    fn load(&self) -> Result<Vec<Record>> {
        Ok(self.records()?.to_vec())
    }
}
