//! Key-value store boundary.
//!
//! The directory talks to its store only through [`KeyValueStore`], which
//! exposes the handful of Redis data structures the directory uses:
//!
//! - hashes (`zip:data:<zip>`)
//! - one geospatial sorted set (`zip:geo`)
//! - plain sets (state/city indexes, service-area reverse indexes)
//! - string values holding JSON documents
//!
//! All writes go through [`WriteBatch`], which every implementation applies
//! atomically (`MULTI`/`EXEC` on Redis, a single lock scope in memory).
//!
//! # Implementations
//!
//! - [`RedisStore`] - production backend over a Redis connection manager
//! - [`MemoryStore`] - in-process backend for tests and local tooling
//! - [`TimeoutStore`] - wraps another store and bounds every call

mod memory;
mod redis_store;
mod timeout;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use hausbaum_core::Coordinates;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use timeout::TimeoutStore;

/// Largest latitude a Redis geospatial index accepts (EPSG:3857 limit).
pub const MAX_GEO_LATITUDE: f64 = 85.051_128_78;

/// Errors raised by a store backend.
///
/// Every variant means the store could not answer; none of them means the
/// requested data is absent.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Redis command or connection failure.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The call did not complete within the configured timeout.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// Backend failure outside Redis (e.g. in-memory store unavailable).
    #[error("store backend error: {0}")]
    Backend(String),

    /// The store rejected a value (e.g. a latitude outside the geo index range).
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// `HSET key field value [field value ...]`
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// `GEOADD key longitude latitude member`
    GeoAdd {
        key: String,
        member: String,
        coordinates: Coordinates,
    },
    /// `SET key value`
    Set { key: String, value: String },
    /// `SADD key member [member ...]`
    SetAdd { key: String, members: Vec<String> },
    /// `SREM key member [member ...]`
    SetRemove { key: String, members: Vec<String> },
    /// `DEL key`
    Delete { key: String },
}

/// An ordered group of writes applied atomically.
///
/// Builder methods skip operations that would be no-ops (an `SADD` with no
/// members), because Redis rejects those outright.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Set fields on a hash.
    #[must_use]
    pub fn hash_set(mut self, key: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        if !fields.is_empty() {
            self.ops.push(WriteOp::HashSet {
                key: key.into(),
                fields,
            });
        }
        self
    }

    /// Add or move a member in a geospatial index.
    #[must_use]
    pub fn geo_add(
        mut self,
        key: impl Into<String>,
        member: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        self.ops.push(WriteOp::GeoAdd {
            key: key.into(),
            member: member.into(),
            coordinates,
        });
        self
    }

    /// Set a string value.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Add members to a set.
    #[must_use]
    pub fn set_add(mut self, key: impl Into<String>, members: Vec<String>) -> Self {
        if !members.is_empty() {
            self.ops.push(WriteOp::SetAdd {
                key: key.into(),
                members,
            });
        }
        self
    }

    /// Remove members from a set.
    #[must_use]
    pub fn set_remove(mut self, key: impl Into<String>, members: Vec<String>) -> Self {
        if !members.is_empty() {
            self.ops.push(WriteOp::SetRemove {
                key: key.into(),
                members,
            });
        }
        self
    }

    /// Delete a key of any type.
    #[must_use]
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    /// Whether the batch contains no operations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations in the batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ops.len()
    }

    /// Borrow the operations in order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consume the batch, yielding its operations in order.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// The store operations the directory depends on.
///
/// Implementations are cheap handles (`Clone` shares the underlying
/// connection or data), so repositories hold them by value.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    /// Apply every operation in `batch` atomically, in order.
    fn apply(&self, batch: WriteBatch) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `HGETALL key`. A missing key yields an empty map.
    fn hash_get_all(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>, StoreError>> + Send;

    /// `GEOPOS key member`.
    fn geo_position(
        &self,
        key: &str,
        member: &str,
    ) -> impl Future<Output = Result<Option<Coordinates>, StoreError>> + Send;

    /// Members of the geo index within `radius_miles` of `member`'s position,
    /// nearest first, at most `limit` of them.
    fn geo_search(
        &self,
        key: &str,
        member: &str,
        radius_miles: f64,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// `ZCARD key` (cardinality of a geo index).
    fn sorted_set_len(&self, key: &str) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// `GET key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// `SMEMBERS key`, in unspecified order.
    fn set_members(&self, key: &str)
    -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// `SISMEMBER key member`.
    fn set_contains(
        &self,
        key: &str,
        member: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
