//! ZIP coordinate store.
//!
//! A ZIP record is split across two structures: the metadata hash
//! `zip:data:<zip>` and the member of the `zip:geo` index holding its
//! centroid. Both are written in one atomic batch, and a ZIP missing either
//! half reads as not found.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use hausbaum_core::{ZipCode, ZipRecord};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    ZIP_GEO_KEY, ZIP_META_KEY, city_index_key, parse_zip_members, state_index_key, zip_data_key,
};
use crate::codec;
use crate::config::DirectoryConfig;
use crate::error::LookupError;
use crate::store::{KeyValueStore, MAX_GEO_LATITUDE, WriteBatch};

const FIELD_CITY: &str = "city";
const FIELD_STATE: &str = "state";
const FIELD_STATE_CODE: &str = "stateCode";
const FIELD_COUNTY: &str = "county";
const FIELD_TIMEZONE: &str = "timezone";

/// Summary of the most recent bulk import, stored at `zip:meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadata {
    /// Number of ZIPs in the geo index after the import.
    pub count: u64,
    pub last_updated: DateTime<Utc>,
}

/// In-process cache of ZIP records. Clones share entries.
pub type ZipCache = Cache<ZipCode, ZipRecord>;

/// Build an empty [`ZipCache`] sized from `config`.
#[must_use]
pub fn zip_cache(config: &DirectoryConfig) -> ZipCache {
    Cache::builder()
        .max_capacity(config.cache_capacity)
        .time_to_live(config.cache_ttl)
        .build()
}

/// Repository for ZIP records.
///
/// Lookups are cached in-process; records only change through re-import,
/// and [`Self::save`] invalidates the entry it overwrites in the cache this
/// handle holds. Clones of a repository share that cache. Repositories built
/// separately over the same store must be given one cache through
/// [`Self::with_cache`], or a save through one leaves the others serving the
/// old record until the TTL expires.
#[derive(Clone)]
pub struct ZipCodeRepository<S> {
    store: S,
    cache: ZipCache,
}

impl<S: KeyValueStore> ZipCodeRepository<S> {
    /// Create a repository over `store` with a fresh cache sized from
    /// `config`.
    #[must_use]
    pub fn new(store: S, config: &DirectoryConfig) -> Self {
        Self::with_cache(store, zip_cache(config))
    }

    /// Create a repository over `store` that shares `cache`.
    #[must_use]
    pub const fn with_cache(store: S, cache: ZipCache) -> Self {
        Self { store, cache }
    }

    /// The record cache, for building further repositories that share it.
    #[must_use]
    pub const fn cache(&self) -> &ZipCache {
        &self.cache
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Upsert a ZIP record and its index entries.
    ///
    /// If the record previously belonged to a different city or state, the
    /// stale index entries are removed in the same batch.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::MalformedRecord` if the latitude is outside the
    /// range a geo index can hold, `LookupError::StoreUnavailable` if the
    /// store fails.
    #[instrument(skip(self, record), fields(zip = %record.zip_code))]
    pub async fn save(&self, record: &ZipRecord) -> Result<(), LookupError> {
        if record.latitude().abs() > MAX_GEO_LATITUDE {
            return Err(LookupError::MalformedRecord(format!(
                "{}: latitude {} is outside the geo index range",
                record.zip_code,
                record.latitude()
            )));
        }

        let data_key = zip_data_key(&record.zip_code);
        let member = record.zip_code.as_str().to_owned();

        let previous = self.store.hash_get_all(&data_key).await?;
        let new_state_key = state_index_key(&record.state_code);
        let new_city_key = city_index_key(&record.city, &record.state_code);

        let mut batch = WriteBatch::new();
        if let Some(old_code) = previous.get(FIELD_STATE_CODE) {
            let old_city = previous.get(FIELD_CITY).map_or("", String::as_str);
            let old_state_key = state_index_key(old_code);
            let old_city_key = city_index_key(old_city, old_code);
            if old_state_key != new_state_key {
                batch = batch.set_remove(old_state_key, vec![member.clone()]);
            }
            if old_city_key != new_city_key {
                batch = batch.set_remove(old_city_key, vec![member.clone()]);
            }
        }

        let batch = batch
            .hash_set(
                data_key,
                vec![
                    (FIELD_CITY.to_owned(), record.city.clone()),
                    (FIELD_STATE.to_owned(), record.state.clone()),
                    (FIELD_COUNTY.to_owned(), record.county.clone()),
                    (FIELD_TIMEZONE.to_owned(), record.timezone.clone()),
                    (FIELD_STATE_CODE.to_owned(), record.state_code.clone()),
                ],
            )
            .geo_add(ZIP_GEO_KEY, member.clone(), record.coordinates)
            .set_add(new_state_key, vec![member.clone()])
            .set_add(new_city_key, vec![member]);

        self.store.apply(batch).await?;
        self.cache.invalidate(&record.zip_code).await;

        debug!("Saved ZIP record");
        Ok(())
    }

    /// Fetch a ZIP record.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` if the metadata hash or the geo entry
    /// is missing, `LookupError::MalformedRecord` if the hash lacks a
    /// required field, `LookupError::StoreUnavailable` if the store fails.
    pub async fn get(&self, zip: &ZipCode) -> Result<ZipRecord, LookupError> {
        if let Some(record) = self.cache.get(zip).await {
            return Ok(record);
        }

        let fields = self.store.hash_get_all(&zip_data_key(zip)).await?;
        if fields.is_empty() {
            return Err(LookupError::NotFound(format!("ZIP {zip}")));
        }

        let coordinates = self
            .store
            .geo_position(ZIP_GEO_KEY, zip.as_str())
            .await?
            .ok_or_else(|| LookupError::NotFound(format!("ZIP {zip} has no coordinates")))?;

        let record = ZipRecord {
            zip_code: zip.clone(),
            coordinates,
            city: required(&fields, zip, FIELD_CITY)?,
            state: required(&fields, zip, FIELD_STATE)?,
            state_code: required(&fields, zip, FIELD_STATE_CODE)?,
            county: fields.get(FIELD_COUNTY).cloned().unwrap_or_default(),
            timezone: fields.get(FIELD_TIMEZONE).cloned().unwrap_or_default(),
        };

        self.cache.insert(zip.clone(), record.clone()).await;
        Ok(record)
    }

    /// Fetch several records concurrently, skipping (and logging) any that
    /// cannot be read. Order follows `zips`.
    pub async fn get_many(&self, zips: &[ZipCode]) -> Vec<ZipRecord> {
        let results = join_all(zips.iter().map(|zip| self.get(zip))).await;

        results
            .into_iter()
            .zip(zips)
            .filter_map(|(result, zip)| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(zip = %zip, error = %e, "Skipping unreadable ZIP record");
                    None
                }
            })
            .collect()
    }

    /// Number of ZIPs in the geo index. Zero means not initialized.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn count(&self) -> Result<u64, LookupError> {
        Ok(self.store.sorted_set_len(ZIP_GEO_KEY).await?)
    }

    /// Whether any ZIP data has been imported.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn is_initialized(&self) -> Result<bool, LookupError> {
        Ok(self.count().await? > 0)
    }

    /// ZIPs whose centroid lies within `radius_miles` of `center`'s, nearest
    /// first, per the geo index. Distances are approximate; callers
    /// recompute them.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn candidates(
        &self,
        center: &ZipCode,
        radius_miles: f64,
        limit: usize,
    ) -> Result<Vec<ZipCode>, LookupError> {
        let members = self
            .store
            .geo_search(ZIP_GEO_KEY, center.as_str(), radius_miles, limit)
            .await?;
        Ok(parse_zip_members(ZIP_GEO_KEY, members))
    }

    /// Records in a state, sorted by ZIP, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the index cannot be read.
    #[instrument(skip(self))]
    pub async fn zips_in_state(
        &self,
        state_code: &str,
        limit: usize,
    ) -> Result<Vec<ZipRecord>, LookupError> {
        self.records_in_index(&state_index_key(state_code), limit)
            .await
    }

    /// Records in a city of a state, sorted by ZIP, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the index cannot be read.
    #[instrument(skip(self))]
    pub async fn zips_in_city(
        &self,
        city: &str,
        state_code: &str,
        limit: usize,
    ) -> Result<Vec<ZipRecord>, LookupError> {
        self.records_in_index(&city_index_key(city, state_code), limit)
            .await
    }

    async fn records_in_index(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<ZipRecord>, LookupError> {
        let mut zips = parse_zip_members(key, self.store.set_members(key).await?);
        zips.sort();
        zips.truncate(limit);
        Ok(self.get_many(&zips).await)
    }

    /// Metadata of the last import, if any.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::MalformedRecord` if the stored JSON is invalid,
    /// `LookupError::StoreUnavailable` if the store fails.
    pub async fn metadata(&self) -> Result<Option<ImportMetadata>, LookupError> {
        self.store
            .get(ZIP_META_KEY)
            .await?
            .map(|raw| codec::decode(ZIP_META_KEY, &raw))
            .transpose()
    }

    /// Record that an import finished now, with the current ZIP count.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn record_import(&self) -> Result<ImportMetadata, LookupError> {
        let metadata = ImportMetadata {
            count: self.count().await?,
            last_updated: Utc::now(),
        };
        let raw = codec::encode(ZIP_META_KEY, &metadata)?;
        self.store
            .apply(WriteBatch::new().set(ZIP_META_KEY, raw))
            .await?;
        Ok(metadata)
    }
}

fn required(
    fields: &HashMap<String, String>,
    zip: &ZipCode,
    name: &str,
) -> Result<String, LookupError> {
    fields
        .get(name)
        .cloned()
        .ok_or_else(|| LookupError::MalformedRecord(format!("zip:data:{zip} is missing {name}")))
}
