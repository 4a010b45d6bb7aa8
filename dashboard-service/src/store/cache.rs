use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use meter_client::db::ConsumptionRow;
use meter_client::domain::Reading;

use crate::store::{QueryWindow, ReadingStore, StoreError};

struct CacheEntry {
    rows: Vec<Reading>,
    stored_at: Instant,
}

/// TTL cache over a `ReadingStore`, keyed by query window.
///
/// Replaces the dashboards' process-wide memoization decorator: the cache is
/// owned by whoever constructed the store, staleness is bounded by the TTL,
/// and `invalidate`/`invalidate_all` drop entries on demand (after a sync
/// job rewrites the stores, for instance). Meter history is never cached.
pub struct CachedReadingStore<S> {
    inner: S,
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<QueryWindow, CacheEntry>>,
}

impl<S> CachedReadingStore<S> {
    pub fn new(inner: S, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop the entry for one window, if present.
    pub fn invalidate(&self, window: &QueryWindow) {
        self.lock().remove(window);
    }

    /// Drop every cached window.
    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<QueryWindow, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, window: &QueryWindow) -> Option<Vec<Reading>> {
        let entries = self.lock();
        let entry = entries.get(window)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.rows.clone())
    }

    fn insert(&self, window: QueryWindow, rows: Vec<Reading>) {
        let mut entries = self.lock();
        entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        if entries.len() >= self.max_entries && !entries.contains_key(&window) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(w, _)| w.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            window,
            CacheEntry {
                rows,
                stored_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<S: ReadingStore> ReadingStore for CachedReadingStore<S> {
    async fn fetch_window(&self, window: &QueryWindow) -> Result<Vec<Reading>, StoreError> {
        if let Some(rows) = self.lookup(window) {
            metrics::counter!("reading_cache_hits_total").increment(1);
            return Ok(rows);
        }
        metrics::counter!("reading_cache_misses_total").increment(1);

        let rows = self.inner.fetch_window(window).await?;
        self.insert(window.clone(), rows.clone());
        Ok(rows)
    }

    async fn meter_history(
        &self,
        meter_id: &str,
        window: &QueryWindow,
    ) -> Result<Vec<ConsumptionRow>, StoreError> {
        self.inner.meter_history(meter_id, window).await
    }
}
