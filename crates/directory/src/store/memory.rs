//! In-process store for tests and local runs without Redis.
//!
//! Mirrors the Redis semantics the directory relies on: missing keys read as
//! empty, writes in a batch land together, and the geo index refuses
//! latitudes outside the Web Mercator range.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use hausbaum_core::{Coordinates, distance_miles};

use super::{KeyValueStore, MAX_GEO_LATITUDE, StoreError, WriteBatch, WriteOp};

#[derive(Debug, Default)]
struct MemoryData {
    strings: HashMap<String, String>,
    hashes: HashMap<String, BTreeMap<String, String>>,
    sets: HashMap<String, BTreeSet<String>>,
    geo: HashMap<String, BTreeMap<String, Coordinates>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    data: RwLock<MemoryData>,
    unavailable: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

/// In-memory [`KeyValueStore`].
///
/// Cloning shares the underlying data. Each fresh store is independent, so
/// tests can run in parallel without interfering.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreError::Backend`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency` (`None` to disable).
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut guard) = self.inner.latency.write() {
            *guard = latency;
        }
    }

    async fn enter(&self) -> Result<(), StoreError> {
        let latency = self
            .inner
            .latency
            .read()
            .map_err(|_| poisoned())?
            .as_ref()
            .copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store unavailable".to_string()));
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryData) -> T) -> Result<T, StoreError> {
        let guard = self.inner.data.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

fn validate(op: &WriteOp) -> Result<(), StoreError> {
    if let WriteOp::GeoAdd {
        member,
        coordinates,
        ..
    } = op
        && coordinates.latitude().abs() > MAX_GEO_LATITUDE
    {
        return Err(StoreError::InvalidData(format!(
            "latitude {} of {member} is outside the geo index range",
            coordinates.latitude()
        )));
    }
    Ok(())
}

fn apply_op(data: &mut MemoryData, op: WriteOp) {
    match op {
        WriteOp::HashSet { key, fields } => {
            data.hashes.entry(key).or_default().extend(fields);
        }
        WriteOp::GeoAdd {
            key,
            member,
            coordinates,
        } => {
            data.geo.entry(key).or_default().insert(member, coordinates);
        }
        WriteOp::Set { key, value } => {
            data.strings.insert(key, value);
        }
        WriteOp::SetAdd { key, members } => {
            data.sets.entry(key).or_default().extend(members);
        }
        WriteOp::SetRemove { key, members } => {
            if let Some(set) = data.sets.get_mut(&key) {
                for member in &members {
                    set.remove(member);
                }
                if set.is_empty() {
                    data.sets.remove(&key);
                }
            }
        }
        WriteOp::Delete { key } => {
            data.strings.remove(&key);
            data.hashes.remove(&key);
            data.sets.remove(&key);
            data.geo.remove(&key);
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.enter().await?;

        // Reject the whole batch before touching anything
        for op in batch.ops() {
            validate(op)?;
        }

        let mut guard = self.inner.data.write().map_err(|_| poisoned())?;
        for op in batch.into_ops() {
            apply_op(&mut guard, op);
        }
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.enter().await?;
        self.read(|data| {
            data.hashes
                .get(key)
                .map(|fields| fields.clone().into_iter().collect())
                .unwrap_or_default()
        })
    }

    async fn geo_position(
        &self,
        key: &str,
        member: &str,
    ) -> Result<Option<Coordinates>, StoreError> {
        self.enter().await?;
        self.read(|data| data.geo.get(key).and_then(|index| index.get(member)).copied())
    }

    async fn geo_search(
        &self,
        key: &str,
        member: &str,
        radius_miles: f64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.enter().await?;
        self.read(|data| {
            let index = data.geo.get(key);
            let center = index
                .and_then(|index| index.get(member))
                .ok_or_else(|| {
                    StoreError::InvalidData(format!("could not decode requested zset member {member}"))
                })?;

            let mut hits: Vec<(f64, &String)> = index
                .into_iter()
                .flatten()
                .filter_map(|(name, coords)| {
                    let d = distance_miles(
                        center.latitude(),
                        center.longitude(),
                        coords.latitude(),
                        coords.longitude(),
                    );
                    (d <= radius_miles).then_some((d, name))
                })
                .collect();

            hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
            Ok(hits
                .into_iter()
                .take(limit)
                .map(|(_, name)| name.clone())
                .collect())
        })?
    }

    async fn sorted_set_len(&self, key: &str) -> Result<u64, StoreError> {
        self.enter().await?;
        self.read(|data| data.geo.get(key).map_or(0, |index| index.len() as u64))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.enter().await?;
        self.read(|data| data.strings.get(key).cloned())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.enter().await?;
        self.read(|data| {
            data.sets
                .get(key)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.enter().await?;
        self.read(|data| data.sets.get(key).is_some_and(|set| set.contains(member)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn coords(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn test_missing_keys_read_empty() {
        let store = MemoryStore::new();
        assert!(store.hash_get_all("nope").await.unwrap().is_empty());
        assert!(store.geo_position("g", "m").await.unwrap().is_none());
        assert_eq!(store.sorted_set_len("g").await.unwrap(), 0);
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.set_members("s").await.unwrap().is_empty());
        assert!(!store.set_contains("s", "m").await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_applies_all_ops() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .hash_set("h", vec![("city".to_string(), "Miami".to_string())])
            .geo_add("g", "33131", coords(25.7697, -80.1892))
            .set("k", "v")
            .set_add("s", vec!["a".to_string(), "b".to_string()]);
        store.apply(batch).await.unwrap();

        assert_eq!(store.hash_get_all("h").await.unwrap()["city"], "Miami");
        assert_eq!(store.sorted_set_len("g").await.unwrap(), 1);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.set_members("s").await.unwrap(), vec!["a", "b"]);

        store
            .apply(
                WriteBatch::new()
                    .set_remove("s", vec!["a".to_string()])
                    .delete("k"),
            )
            .await
            .unwrap();
        assert_eq!(store.set_members("s").await.unwrap(), vec!["b"]);
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_geo_rejects_whole_batch() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .set("k", "v")
            .geo_add("g", "99999", coords(89.0, 0.0));
        let err = store.apply(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_geo_search_orders_and_limits() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .geo_add("g", "a", coords(40.0, -75.0))
            .geo_add("g", "c", coords(40.2, -75.0))
            .geo_add("g", "b", coords(40.1, -75.0))
            .geo_add("g", "far", coords(45.0, -75.0));
        store.apply(batch).await.unwrap();

        let hits = store.geo_search("g", "a", 50.0, 10).await.unwrap();
        assert_eq!(hits, vec!["a", "b", "c"]);

        let hits = store.geo_search("g", "a", 50.0, 2).await.unwrap();
        assert_eq!(hits, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_geo_search_unknown_member() {
        let store = MemoryStore::new();
        let err = store.geo_search("g", "missing", 5.0, 10).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get("k").await.unwrap_err(),
            StoreError::Backend(_)
        ));
        store.set_unavailable(false);
        assert!(store.get("k").await.is_ok());
    }
}
