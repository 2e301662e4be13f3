//! Per-call timeout wrapper.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use hausbaum_core::Coordinates;

use super::{KeyValueStore, StoreError, WriteBatch};

/// Bounds every call on the wrapped store by a fixed timeout.
///
/// An elapsed call surfaces as [`StoreError::Timeout`], which callers treat
/// as a transient outage rather than missing data.
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: KeyValueStore> TimeoutStore<S> {
    #[must_use]
    pub const fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

impl<S: KeyValueStore> KeyValueStore for TimeoutStore<S> {
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.bounded(self.inner.apply(batch)).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.bounded(self.inner.hash_get_all(key)).await
    }

    async fn geo_position(
        &self,
        key: &str,
        member: &str,
    ) -> Result<Option<Coordinates>, StoreError> {
        self.bounded(self.inner.geo_position(key, member)).await
    }

    async fn geo_search(
        &self,
        key: &str,
        member: &str,
        radius_miles: f64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.bounded(self.inner.geo_search(key, member, radius_miles, limit))
            .await
    }

    async fn sorted_set_len(&self, key: &str) -> Result<u64, StoreError> {
        self.bounded(self.inner.sorted_set_len(key)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.bounded(self.inner.get(key)).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.bounded(self.inner.set_members(key)).await
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.bounded(self.inner.set_contains(key, member)).await
    }
}
