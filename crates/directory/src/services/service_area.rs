//! Service-area membership and directory search.
//!
//! Membership is exact: a business serves a ZIP only if it listed that ZIP
//! or is nationwide. "Near me" matching is a separate, explicit call
//! ([`ServiceAreaService::serves_near`], or a radius on
//! [`ServiceAreaService::find_businesses`]).

use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;
use hausbaum_core::{BusinessId, BusinessServiceArea, Category, ZipCode};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::ProximityResolver;
use crate::config::DirectoryConfig;
use crate::db::{CategoryRepository, ServiceAreaRepository};
use crate::error::LookupError;
use crate::store::KeyValueStore;

/// A business found by [`ServiceAreaService::find_businesses`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMatch {
    pub business_id: BusinessId,
    /// The ZIP through which the business matched (the searched ZIP for
    /// nationwide businesses).
    pub matched_zip: ZipCode,
    /// Distance from the searched ZIP to `matched_zip`.
    pub distance_miles: f64,
    pub nationwide: bool,
}

/// Entry point for service-area edits, membership checks and search.
///
/// Like [`ProximityResolver`], every method here absorbs store failures:
/// they are logged and reported as `false`, `None` or an empty list.
#[derive(Clone)]
pub struct ServiceAreaService<S> {
    resolver: ProximityResolver<S>,
    areas: ServiceAreaRepository<S>,
    categories: CategoryRepository<S>,
}

impl<S: KeyValueStore> ServiceAreaService<S> {
    #[must_use]
    pub fn new(store: S, config: &DirectoryConfig) -> Self {
        Self {
            resolver: ProximityResolver::new(store.clone(), config),
            areas: ServiceAreaRepository::new(store.clone()),
            categories: CategoryRepository::new(store),
        }
    }

    /// Build a service that shares an existing resolver (and its cache).
    #[must_use]
    pub fn with_resolver(resolver: ProximityResolver<S>) -> Self {
        let store = resolver.zip_codes().store().clone();
        Self {
            areas: ServiceAreaRepository::new(store.clone()),
            categories: CategoryRepository::new(store),
            resolver,
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &ProximityResolver<S> {
        &self.resolver
    }

    #[must_use]
    pub const fn areas(&self) -> &ServiceAreaRepository<S> {
        &self.areas
    }

    #[must_use]
    pub const fn categories(&self) -> &CategoryRepository<S> {
        &self.categories
    }

    /// Exact membership test. Stateless; no radius expansion.
    #[must_use]
    pub fn is_served_zip(area: &BusinessServiceArea, zip: &ZipCode) -> bool {
        area.is_served_zip(zip)
    }

    /// Replace a business's service area. Returns whether it was saved.
    pub async fn save(&self, area: &BusinessServiceArea) -> bool {
        self.areas.save(area).await.map_or_else(
            |e| {
                e.report("save_service_area");
                false
            },
            |()| true,
        )
    }

    /// A business's service area, if it has one and it can be read.
    pub async fn get(&self, business: &BusinessId) -> Option<BusinessServiceArea> {
        self.areas.get(business).await.unwrap_or_else(|e| {
            e.report("get_service_area");
            None
        })
    }

    /// Remove a business's service area and category listings. Returns
    /// whether both were removed.
    pub async fn delete(&self, business: &BusinessId) -> bool {
        let (areas, categories) =
            futures::join!(self.areas.delete(business), self.categories.remove(business));
        let mut ok = true;
        for result in [areas, categories] {
            if let Err(e) = result {
                e.report("delete_business");
                ok = false;
            }
        }
        ok
    }

    /// Replace the categories a business is listed under. Returns whether
    /// the assignment was saved.
    pub async fn assign_categories(
        &self,
        business: &BusinessId,
        categories: impl IntoIterator<Item = Category>,
    ) -> bool {
        self.categories
            .assign(business, categories)
            .await
            .map_or_else(
                |e| {
                    e.report("assign_categories");
                    false
                },
                |()| true,
            )
    }

    /// Whether the stored service area of `business` covers `zip` exactly.
    pub async fn is_business_serving(&self, business: &BusinessId, zip: &str) -> bool {
        let Ok(zip) = ZipCode::normalize(zip) else {
            return false;
        };
        self.get(business)
            .await
            .is_some_and(|area| area.is_served_zip(&zip))
    }

    /// Whether `area` covers any ZIP within `radius_miles` of `zip`.
    ///
    /// Nationwide areas always match. The ZIP itself counts when it is in
    /// the area, even if the store does not know it.
    pub async fn serves_near(
        &self,
        area: &BusinessServiceArea,
        zip: &str,
        radius_miles: f64,
        limit: usize,
    ) -> bool {
        if area.is_nationwide {
            return true;
        }
        let Ok(center) = ZipCode::normalize(zip) else {
            return false;
        };
        if area.is_served_zip(&center) {
            return true;
        }

        self.resolver
            .find_within_radius(center.as_str(), radius_miles, limit)
            .await
            .iter()
            .any(|hit| area.is_served_zip(&hit.record.zip_code))
    }

    /// Businesses serving `zip` exactly (nationwide ones included), sorted.
    pub async fn businesses_serving(&self, zip: &str) -> Vec<BusinessId> {
        let Ok(zip) = ZipCode::normalize(zip) else {
            return Vec::new();
        };
        self.areas.businesses_serving(&zip).await.unwrap_or_else(|e| {
            e.report("businesses_serving");
            Vec::new()
        })
    }

    /// Businesses serving `zip`, nearest first.
    ///
    /// Without a radius this is exact membership. With one, businesses
    /// listing any ZIP within the radius match through the nearest such ZIP.
    /// Nationwide businesses match at distance 0. A category restricts the
    /// result to businesses listed under it. Ties are ordered by business ID.
    pub async fn find_businesses(
        &self,
        zip: &str,
        category: Option<Category>,
        radius_miles: Option<f64>,
        limit: usize,
    ) -> Vec<BusinessMatch> {
        let Ok(zip) = ZipCode::normalize(zip) else {
            warn!(input = %zip, "Business search with invalid ZIP");
            return Vec::new();
        };

        self.try_find_businesses(&zip, category, radius_miles, limit)
            .await
            .unwrap_or_else(|e| {
                e.report("find_businesses");
                Vec::new()
            })
    }

    #[instrument(skip(self, zip), fields(zip = %zip))]
    async fn try_find_businesses(
        &self,
        zip: &ZipCode,
        category: Option<Category>,
        radius_miles: Option<f64>,
        limit: usize,
    ) -> Result<Vec<BusinessMatch>, LookupError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let zones = self.search_zones(zip, radius_miles).await?;

        let listings = join_all(
            zones
                .iter()
                .map(|(zone, _)| self.areas.businesses_in_zip(zone)),
        )
        .await;

        let nationwide: BTreeSet<BusinessId> =
            self.areas.nationwide_businesses().await?.into_iter().collect();

        // Zones are nearest first, so the first zone a business appears in wins
        let mut matches: BTreeMap<BusinessId, BusinessMatch> = BTreeMap::new();
        for ((zone, distance), listed) in zones.iter().zip(listings) {
            for business_id in listed? {
                matches
                    .entry(business_id.clone())
                    .or_insert_with(|| BusinessMatch {
                        nationwide: nationwide.contains(&business_id),
                        business_id,
                        matched_zip: zone.clone(),
                        distance_miles: *distance,
                    });
            }
        }
        for business_id in nationwide {
            matches
                .entry(business_id.clone())
                .and_modify(|m| {
                    m.matched_zip = zip.clone();
                    m.distance_miles = 0.0;
                })
                .or_insert_with(|| BusinessMatch {
                    business_id,
                    matched_zip: zip.clone(),
                    distance_miles: 0.0,
                    nationwide: true,
                });
        }

        if let Some(category) = category {
            let listed: BTreeSet<BusinessId> = self
                .categories
                .businesses_in(category)
                .await?
                .into_iter()
                .collect();
            matches.retain(|id, _| listed.contains(id));
        }

        let mut results: Vec<BusinessMatch> = matches.into_values().collect();
        results.sort_by(|a, b| {
            a.distance_miles
                .total_cmp(&b.distance_miles)
                .then_with(|| a.business_id.cmp(&b.business_id))
        });
        results.truncate(limit);

        debug!(found = results.len(), "Business search complete");
        Ok(results)
    }

    /// The ZIPs to search, with their distance from `zip`, nearest first.
    async fn search_zones(
        &self,
        zip: &ZipCode,
        radius_miles: Option<f64>,
    ) -> Result<Vec<(ZipCode, f64)>, LookupError> {
        let exact = vec![(zip.clone(), 0.0)];
        let Some(radius_miles) = radius_miles else {
            return Ok(exact);
        };

        match self
            .resolver
            .try_find_within_radius(zip, radius_miles, self.resolver.default_limit())
            .await
        {
            Ok(hits) if !hits.is_empty() => Ok(hits
                .into_iter()
                .map(|hit| (hit.record.zip_code, hit.distance_miles))
                .collect()),
            Ok(_) => Ok(exact),
            // An unknown ZIP can still be listed explicitly
            Err(LookupError::NotFound(_)) => {
                debug!("Search ZIP has no coordinates; using exact match only");
                Ok(exact)
            }
            Err(e) => Err(e),
        }
    }
}
