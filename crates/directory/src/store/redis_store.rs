//! Redis-backed store.
//!
//! ZIP data is small (~42,000 ZIPs, a few hundred bytes each) and read-mostly,
//! so everything lives in one Redis database:
//!
//! - Redis hash per ZIP: `zip:data:<zip>` → city, state, county, timezone, stateCode
//! - One geo sorted set: `zip:geo`, member = ZIP, score = geohash of the centroid
//! - Plain sets for secondary indexes and service areas
//!
//! Writes are pipelined inside `MULTI`/`EXEC`, so a ZIP's hash and geo entry
//! become visible together.

use std::collections::HashMap;

use hausbaum_core::Coordinates;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::geo::{Coord, RadiusOptions, RadiusOrder, Unit};
use redis::{AsyncCommands, Client};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::{KeyValueStore, StoreError, WriteBatch, WriteOp};

/// Store backed by a Redis (or Redis-compatible) server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis and return a store over a self-reconnecting
    /// connection manager.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Redis` if the URL is invalid or the initial
    /// connection fails.
    pub async fn connect(redis_url: &SecretString) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);

        let client = Client::open(redis_url.expose_secret())?;
        let conn = client.get_connection_manager_with_config(config).await?;

        debug!("Redis connection manager ready");
        Ok(Self { conn })
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub const fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl KeyValueStore for RedisStore {
    #[instrument(skip(self, batch), fields(ops = batch.len()))]
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();

        for op in batch.into_ops() {
            match op {
                WriteOp::HashSet { key, fields } => {
                    pipe.hset_multiple(key, fields.as_slice()).ignore();
                }
                WriteOp::GeoAdd {
                    key,
                    member,
                    coordinates,
                } => {
                    let coord = Coord::lon_lat(coordinates.longitude(), coordinates.latitude());
                    pipe.geo_add(key, (coord, member)).ignore();
                }
                WriteOp::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                WriteOp::SetAdd { key, members } => {
                    pipe.sadd(key, members).ignore();
                }
                WriteOp::SetRemove { key, members } => {
                    pipe.srem(key, members).ignore();
                }
                WriteOp::Delete { key } => {
                    pipe.del(key).ignore();
                }
            }
        }

        let mut conn = self.conn.clone();
        pipe.query_async::<()>(&mut conn).await?;
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn geo_position(
        &self,
        key: &str,
        member: &str,
    ) -> Result<Option<Coordinates>, StoreError> {
        let mut conn = self.conn.clone();
        let positions: Vec<Option<Coord<f64>>> = conn.geo_pos(key, member).await?;

        positions
            .into_iter()
            .next()
            .flatten()
            .map(|coord| {
                Coordinates::new(coord.latitude, coord.longitude)
                    .map_err(|e| StoreError::InvalidData(format!("geo position of {member}: {e}")))
            })
            .transpose()
    }

    async fn geo_search(
        &self,
        key: &str,
        member: &str,
        radius_miles: f64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let options = RadiusOptions::default()
            .limit(limit)
            .order(RadiusOrder::Asc);

        let members: Vec<String> = conn
            .geo_radius_by_member(key, member, radius_miles, Unit::Miles, options)
            .await?;
        Ok(members)
    }

    async fn sorted_set_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let len: u64 = conn.zcard(key).await?;
        Ok(len)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let found: bool = conn.sismember(key, member).await?;
        Ok(found)
    }
}
