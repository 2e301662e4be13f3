//! Service-area persistence.
//!
//! The JSON document at `business:<id>:serviceArea` is the source of truth.
//! The ZIP set, the reverse index and the nationwide set are derived from it
//! and rewritten in the same batch on every save.

use std::collections::BTreeSet;

use hausbaum_core::{BusinessId, BusinessServiceArea, ZipCode};
use tracing::{debug, instrument};

use super::{
    NATIONWIDE_KEY, business_zips_key, parse_business_members, parse_zip_members,
    service_area_key, zip_businesses_key,
};
use crate::codec;
use crate::error::LookupError;
use crate::store::{KeyValueStore, WriteBatch};

/// Repository for business service areas.
#[derive(Debug, Clone)]
pub struct ServiceAreaRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ServiceAreaRepository<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Replace a business's service area.
    ///
    /// The previous area is superseded, never merged: ZIPs missing from
    /// `area` lose their reverse-index entry.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    #[instrument(skip(self, area), fields(business = %area.business_id, zips = area.zip_codes.len(), nationwide = area.is_nationwide))]
    pub async fn save(&self, area: &BusinessServiceArea) -> Result<(), LookupError> {
        let business = &area.business_id;
        let zips_key = business_zips_key(business);

        let previous: BTreeSet<ZipCode> =
            parse_zip_members(&zips_key, self.store.set_members(&zips_key).await?)
                .into_iter()
                .collect();

        let document = codec::encode(&service_area_key(business), area)?;
        let member = vec![business.as_str().to_owned()];

        let mut batch = WriteBatch::new()
            .set(service_area_key(business), document)
            .delete(zips_key.clone())
            .set_add(
                zips_key,
                area.zip_codes.iter().map(|z| z.as_str().to_owned()).collect(),
            );

        for stale in previous.difference(&area.zip_codes) {
            batch = batch.set_remove(zip_businesses_key(stale), member.clone());
        }
        for zip in &area.zip_codes {
            batch = batch.set_add(zip_businesses_key(zip), member.clone());
        }

        batch = if area.is_nationwide {
            batch.set_add(NATIONWIDE_KEY, member)
        } else {
            batch.set_remove(NATIONWIDE_KEY, member)
        };

        self.store.apply(batch).await?;
        debug!("Saved service area");
        Ok(())
    }

    /// Fetch a business's service area, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::MalformedRecord` if the stored document is
    /// invalid, `LookupError::StoreUnavailable` if the store fails.
    pub async fn get(
        &self,
        business: &BusinessId,
    ) -> Result<Option<BusinessServiceArea>, LookupError> {
        let key = service_area_key(business);
        self.store
            .get(&key)
            .await?
            .map(|raw| codec::decode(&key, &raw))
            .transpose()
    }

    /// Remove a business's service area and every index entry derived
    /// from it.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    #[instrument(skip(self, business), fields(business = %business))]
    pub async fn delete(&self, business: &BusinessId) -> Result<(), LookupError> {
        let zips_key = business_zips_key(business);
        let zips = parse_zip_members(&zips_key, self.store.set_members(&zips_key).await?);
        let member = vec![business.as_str().to_owned()];

        let mut batch = WriteBatch::new()
            .delete(service_area_key(business))
            .delete(zips_key)
            .set_remove(NATIONWIDE_KEY, member.clone());
        for zip in &zips {
            batch = batch.set_remove(zip_businesses_key(zip), member.clone());
        }

        self.store.apply(batch).await?;
        debug!(zips = zips.len(), "Deleted service area");
        Ok(())
    }

    /// Businesses that listed `zip` explicitly (nationwide ones excluded).
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn businesses_in_zip(&self, zip: &ZipCode) -> Result<Vec<BusinessId>, LookupError> {
        let key = zip_businesses_key(zip);
        let mut ids = parse_business_members(&key, self.store.set_members(&key).await?);
        ids.sort();
        Ok(ids)
    }

    /// Businesses that serve every ZIP.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn nationwide_businesses(&self) -> Result<Vec<BusinessId>, LookupError> {
        let mut ids =
            parse_business_members(NATIONWIDE_KEY, self.store.set_members(NATIONWIDE_KEY).await?);
        ids.sort();
        Ok(ids)
    }

    /// Businesses serving `zip`: the nationwide set plus explicit listings,
    /// sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn businesses_serving(&self, zip: &ZipCode) -> Result<Vec<BusinessId>, LookupError> {
        let mut ids: BTreeSet<BusinessId> = self.nationwide_businesses().await?.into_iter().collect();
        ids.extend(self.businesses_in_zip(zip).await?);
        Ok(ids.into_iter().collect())
    }

    /// Whether `business` is in the nationwide set.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn is_nationwide(&self, business: &BusinessId) -> Result<bool, LookupError> {
        Ok(self
            .store
            .set_contains(NATIONWIDE_KEY, business.as_str())
            .await?)
    }
}
