use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

use super::{PersistError, SeriesError};
use super::persist::KeyValueStore;
use super::series::TimeSeries;
use crate::oem::{format_epoch, StateVector};

/// Key the active series is mirrored under.
pub const SERIES_KEY: &str = "iss_data";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSeries {
    saved_at: DateTime<Utc>,
    vectors: Vec<StateVector>,
}

/// Holder of the active [`TimeSeries`].
///
/// The series is swapped as a whole behind an `Arc`; the lock is only held long
/// enough to clone or replace the pointer, so a reader always works on one
/// complete snapshot. Every install bumps a generation number, which orders the
/// writes to persistence without holding the swap lock across them.
pub struct SeriesStore {
    current: RwLock<Installed>,
    /// Generation of the series last written to persistence.
    persisted: Mutex<u64>,
    persistence: Arc<dyn KeyValueStore>,
}

struct Installed {
    series: Arc<TimeSeries>,
    /// Zero until something (a refresh or a rehydrate) installs a series.
    generation: u64,
}

impl SeriesStore {
    pub fn new(persistence: Arc<dyn KeyValueStore>) -> Self {
        Self {
            current: RwLock::new(Installed {
                series: Arc::new(TimeSeries::default()),
                generation: 0,
            }),
            persisted: Mutex::new(0),
            persistence,
        }
    }

    pub fn snapshot(&self) -> Arc<TimeSeries> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .series
            .clone()
    }

    /// Install `series` as the active data set and mirror it to persistence.
    /// Persistence failures are logged; the in-memory swap always happens.
    pub async fn replace(&self, series: TimeSeries) {
        let series = Arc::new(series);
        let generation = self.install(series.clone());

        let mut persisted = self.persisted.lock().await;
        if *persisted > generation {
            log::debug!("Series generation {} superseded before it was persisted", generation);
            return;
        }
        match self.persist(&series).await {
            Ok(()) => *persisted = generation,
            Err(e) => {
                log::warn!("Failed to persist series ({} vectors): {}", series.len(), e)
            }
        }
    }

    /// Load the last persisted series, unless a refresh already installed one.
    /// Returns the number of vectors installed.
    pub async fn rehydrate(&self) -> Result<usize, PersistError> {
        let Some(blob) = self.persistence.get(SERIES_KEY).await? else {
            log::debug!("No persisted series found");
            return Ok(0);
        };
        let persisted: PersistedSeries = serde_json::from_slice(&blob)?;
        let series = TimeSeries::new(persisted.vectors);
        let count = series.len();

        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if current.generation > 0 {
                log::debug!("Series already loaded, ignoring persisted copy");
                return Ok(0);
            }
            current.series = Arc::new(series);
            current.generation = 1;
        }

        log::info!(
            "Rehydrated {} state vectors saved at {}",
            count,
            persisted.saved_at
        );
        Ok(count)
    }

    pub fn all(&self) -> Vec<DateTime<Utc>> {
        self.snapshot().vectors().iter().map(|v| v.epoch).collect()
    }

    pub fn range(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<DateTime<Utc>>, SeriesError> {
        let series = self.snapshot();
        let page = series.range(limit, offset)?;
        Ok(page.iter().map(|v| v.epoch).collect())
    }

    pub fn get(&self, epoch: DateTime<Utc>) -> Result<StateVector, SeriesError> {
        self.snapshot()
            .get(epoch)
            .copied()
            .ok_or_else(|| SeriesError::NotFound(format_epoch(&epoch)))
    }

    /// Closest sample to `t`, along with the snapshot it was picked from.
    pub fn nearest(&self, t: DateTime<Utc>) -> Result<(StateVector, Arc<TimeSeries>), SeriesError> {
        let series = self.snapshot();
        let closest = *series.nearest(t).ok_or(SeriesError::EmptySeries)?;
        Ok((closest, series))
    }

    fn install(&self, series: Arc<TimeSeries>) -> u64 {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current.series = series;
        current.generation += 1;
        current.generation
    }

    async fn persist(&self, series: &TimeSeries) -> Result<(), PersistError> {
        let blob = serde_json::to_vec(&PersistedSeries {
            saved_at: Utc::now(),
            vectors: series.vectors().to_vec(),
        })?;
        self.persistence.put(SERIES_KEY, blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oem::parse_oem;
    use crate::series::MemoryStore;
    use crate::test_support::{epoch, SAMPLE_OEM};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn put(&self, _key: &str, _blob: Vec<u8>) -> Result<(), PersistError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PersistError> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    /// Serves a fixed blob and refuses writes.
    struct ReadOnlyStore(Vec<u8>);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn put(&self, _key: &str, _blob: Vec<u8>) -> Result<(), PersistError> {
            Err(std::io::Error::other("read-only").into())
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PersistError> {
            Ok(Some(self.0.clone()))
        }
    }

    /// Holds the first write until `gate` is notified.
    struct GatedStore {
        inner: MemoryStore,
        first: std::sync::atomic::AtomicBool,
        entered: Notify,
        gate: Notify,
    }

    impl GatedStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                first: std::sync::atomic::AtomicBool::new(true),
                entered: Notify::new(),
                gate: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for GatedStore {
        async fn put(&self, key: &str, blob: Vec<u8>) -> Result<(), PersistError> {
            if self.first.swap(false, std::sync::atomic::Ordering::SeqCst) {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            self.inner.put(key, blob).await
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
            self.inner.get(key).await
        }
    }

    fn sample_series() -> TimeSeries {
        TimeSeries::new(parse_oem(SAMPLE_OEM.as_bytes()).unwrap())
    }

    #[tokio::test]
    async fn empty_store_reports_empty_series() {
        let store = SeriesStore::new(Arc::new(MemoryStore::new()));
        assert!(store.all().is_empty());
        assert!(matches!(
            store.nearest(epoch("2024-300T00:00:00Z")),
            Err(SeriesError::EmptySeries)
        ));
    }

    #[tokio::test]
    async fn nearest_comes_with_its_snapshot() {
        let store = SeriesStore::new(Arc::new(MemoryStore::new()));
        store.replace(sample_series()).await;

        let (closest, series) = store.nearest(epoch("2024-300T00:03:00Z")).unwrap();
        assert_eq!(closest.epoch, epoch("2024-300T00:04:00Z"));
        assert_eq!(series.len(), 3);

        store.replace(TimeSeries::default()).await;
        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn parsed_values_survive_replace() {
        let store = SeriesStore::new(Arc::new(MemoryStore::new()));
        let vectors = parse_oem(SAMPLE_OEM.as_bytes()).unwrap();
        store.replace(TimeSeries::new(vectors.clone())).await;

        for expected in &vectors {
            let found = store.get(expected.epoch).unwrap();
            for i in 0..3 {
                assert!((found.position[i] - expected.position[i]).abs() < 1e-9);
                assert!((found.velocity[i] - expected.velocity[i]).abs() < 1e-9);
            }
        }
        assert!(matches!(
            store.get(epoch("2024-300T00:01:00Z")),
            Err(SeriesError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn epochs_strictly_ascending() {
        let store = SeriesStore::new(Arc::new(MemoryStore::new()));
        store.replace(sample_series()).await;
        let all = store.all();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(store.range(Some(1), Some(1)).unwrap(), vec![all[1]]);
    }

    #[tokio::test]
    async fn snapshot_is_unaffected_by_replace() {
        let store = SeriesStore::new(Arc::new(MemoryStore::new()));
        store.replace(sample_series()).await;
        let before = store.snapshot();

        store.replace(TimeSeries::default()).await;

        assert_eq!(before.len(), 3);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn rehydrates_from_persisted_copy() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let first = SeriesStore::new(kv.clone());
        first.replace(sample_series()).await;

        let restarted = SeriesStore::new(kv);
        assert_eq!(restarted.rehydrate().await.unwrap(), 3);
        assert_eq!(restarted.all(), first.all());
    }

    #[tokio::test]
    async fn rehydrate_does_not_clobber_fresh_data() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        SeriesStore::new(kv.clone()).replace(sample_series()).await;

        let store = SeriesStore::new(kv);
        let fresh = TimeSeries::new(sample_series().vectors()[..1].to_vec());
        store.replace(fresh).await;

        assert_eq!(store.rehydrate().await.unwrap(), 0);
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_blob_is_an_error_not_a_panic() {
        let kv = Arc::new(MemoryStore::new());
        kv.put(SERIES_KEY, b"{ not json".to_vec()).await.unwrap();

        let store = SeriesStore::new(kv);
        assert!(matches!(store.rehydrate().await, Err(PersistError::Json(_))));
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn broken_persistence_degrades_to_memory() {
        let store = SeriesStore::new(Arc::new(BrokenStore));
        assert!(store.rehydrate().await.is_err());

        store.replace(sample_series()).await;
        assert_eq!(store.all().len(), 3);
    }

    #[tokio::test]
    async fn empty_feed_is_not_overwritten_by_rehydrate() {
        let kv = Arc::new(MemoryStore::new());
        SeriesStore::new(kv.clone()).replace(sample_series()).await;
        let blob = kv.get(SERIES_KEY).await.unwrap().unwrap();

        let store = SeriesStore::new(Arc::new(ReadOnlyStore(blob)));
        store.replace(TimeSeries::default()).await;

        assert_eq!(store.rehydrate().await.unwrap(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn replace_is_visible_while_earlier_write_is_pending() {
        let kv = Arc::new(GatedStore::new());
        let store = Arc::new(SeriesStore::new(kv.clone()));
        let vectors = sample_series().vectors().to_vec();

        let first = tokio::spawn({
            let store = store.clone();
            let vectors = vectors[..1].to_vec();
            async move { store.replace(TimeSeries::new(vectors)).await }
        });
        kv.entered.notified().await;

        let second = tokio::spawn({
            let store = store.clone();
            let vectors = vectors.clone();
            async move { store.replace(TimeSeries::new(vectors)).await }
        });
        while store.snapshot().len() != 3 {
            tokio::task::yield_now().await;
        }
        assert!(!first.is_finished());

        kv.gate.notify_one();
        first.await.unwrap();
        second.await.unwrap();

        let restarted = SeriesStore::new(kv);
        assert_eq!(restarted.rehydrate().await.unwrap(), 3);
    }
}
