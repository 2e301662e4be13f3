//! Radius queries over the ZIP coordinate store.

use std::cmp::Ordering;

use hausbaum_core::{ZipCode, ZipCodeError, ZipRecord, ZipWithDistance};
use tracing::{debug, instrument, warn};

use crate::config::DirectoryConfig;
use crate::db::ZipCodeRepository;
use crate::error::LookupError;
use crate::store::KeyValueStore;

/// Outcome of validating user-entered ZIP text against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ZipValidation {
    /// Well-formed and present in the store.
    Valid(ZipRecord),
    /// Not a 5-digit ZIP or ZIP+4.
    InvalidFormat(ZipCodeError),
    /// Well-formed but unknown to the store.
    NotFound(ZipCode),
    /// The store could not be reached.
    Unavailable,
}

impl ZipValidation {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// User-facing explanation for an invalid result.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Valid(_) => None,
            Self::InvalidFormat(_) => {
                Some("Invalid ZIP code format. Please enter a 5-digit ZIP code.".to_owned())
            }
            Self::NotFound(zip) => Some(format!("ZIP code {zip} not found in our database")),
            Self::Unavailable => Some("Error validating ZIP code".to_owned()),
        }
    }
}

/// Entry point for ZIP lookups and radius queries.
///
/// The `try_` methods return typed errors. The rest never fail: lookups
/// that cannot be answered are logged and come back empty.
#[derive(Clone)]
pub struct ProximityResolver<S> {
    zips: ZipCodeRepository<S>,
    default_limit: usize,
}

impl<S: KeyValueStore> ProximityResolver<S> {
    /// Create a resolver over `store`.
    ///
    /// The resolver gets its own ZIP cache. Build further components from
    /// [`Self::zip_codes`] (or [`Self::with_zip_codes`]) so saves through them
    /// invalidate the records this resolver serves.
    #[must_use]
    pub fn new(store: S, config: &DirectoryConfig) -> Self {
        Self::with_zip_codes(ZipCodeRepository::new(store, config), config)
    }

    /// Build a resolver over an existing repository, sharing its cache.
    #[must_use]
    pub const fn with_zip_codes(zips: ZipCodeRepository<S>, config: &DirectoryConfig) -> Self {
        Self {
            zips,
            default_limit: config.default_limit,
        }
    }

    /// The ZIP repository this resolver reads from.
    #[must_use]
    pub const fn zip_codes(&self) -> &ZipCodeRepository<S> {
        &self.zips
    }

    /// Result cap used by callers that do not pick one.
    #[must_use]
    pub const fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Look up a ZIP given as user text (ZIP+4 and surrounding whitespace
    /// accepted).
    pub async fn lookup(&self, zip: &str) -> Option<ZipRecord> {
        let zip = match ZipCode::normalize(zip) {
            Ok(zip) => zip,
            Err(e) => {
                debug!(input = %zip, error = %e, "Rejected ZIP input");
                return None;
            }
        };

        match self.zips.get(&zip).await {
            Ok(record) => Some(record),
            Err(e) => {
                e.report("lookup");
                None
            }
        }
    }

    /// City and full state name of a ZIP.
    pub async fn city_state(&self, zip: &str) -> Option<(String, String)> {
        self.lookup(zip)
            .await
            .map(|record| (record.city, record.state))
    }

    /// Check user-entered ZIP text for format and existence.
    pub async fn validate(&self, input: &str) -> ZipValidation {
        let zip = match ZipCode::normalize(input) {
            Ok(zip) => zip,
            Err(e) => return ZipValidation::InvalidFormat(e),
        };

        match self.zips.get(&zip).await {
            Ok(record) => ZipValidation::Valid(record),
            Err(LookupError::NotFound(_)) => ZipValidation::NotFound(zip),
            Err(e) => {
                e.report("validate");
                ZipValidation::Unavailable
            }
        }
    }

    /// ZIPs within `radius_miles` of `center`, nearest first.
    ///
    /// Candidates come from the geo index; each one's distance is then
    /// recomputed from its stored centroid and anything beyond the radius
    /// is dropped. Ties are broken by ZIP. Candidates whose record cannot be
    /// read are skipped.
    ///
    /// A non-positive or NaN radius yields only the center, at distance 0.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` if the center is unknown,
    /// `LookupError::StoreUnavailable` if the store fails.
    #[instrument(skip(self, center), fields(center = %center))]
    pub async fn try_find_within_radius(
        &self,
        center: &ZipCode,
        radius_miles: f64,
        limit: usize,
    ) -> Result<Vec<ZipWithDistance>, LookupError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let origin = self.zips.get(center).await?;

        if radius_miles.is_nan() || radius_miles <= 0.0 {
            return Ok(vec![ZipWithDistance {
                record: origin,
                distance_miles: 0.0,
            }]);
        }

        let candidates = self.zips.candidates(center, radius_miles, limit).await?;
        let records = self.zips.get_many(&candidates).await;

        let mut results: Vec<ZipWithDistance> = records
            .into_iter()
            .filter_map(|record| {
                let distance_miles = if record.zip_code == origin.zip_code {
                    0.0
                } else {
                    origin.distance_to(&record)
                };
                (distance_miles <= radius_miles).then_some(ZipWithDistance {
                    record,
                    distance_miles,
                })
            })
            .collect();

        results.sort_by(by_distance_then_zip);
        results.truncate(limit);

        debug!(radius_miles, found = results.len(), "Radius query complete");
        Ok(results)
    }

    /// ZIPs within `radius_miles` of `center` (user text), nearest first.
    ///
    /// Never fails: an unknown or malformed center, or a store outage,
    /// yields an empty list.
    pub async fn find_within_radius(
        &self,
        center: &str,
        radius_miles: f64,
        limit: usize,
    ) -> Vec<ZipWithDistance> {
        let center = match ZipCode::normalize(center) {
            Ok(zip) => zip,
            Err(e) => {
                warn!(input = %center, error = %e, "Radius query with invalid center");
                return Vec::new();
            }
        };

        match self
            .try_find_within_radius(&center, radius_miles, limit)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                e.report("find_within_radius");
                Vec::new()
            }
        }
    }

    /// Great-circle distance in miles between two ZIP centroids.
    pub async fn distance_between(&self, a: &str, b: &str) -> Option<f64> {
        let (a, b) = futures::join!(self.lookup(a), self.lookup(b));
        Some(a?.distance_to(&b?))
    }

    /// Number of ZIPs in the store; 0 if the store cannot be read.
    pub async fn count(&self) -> u64 {
        self.zips.count().await.unwrap_or_else(|e| {
            e.report("count");
            0
        })
    }

    /// Whether ZIP data has been imported.
    pub async fn is_initialized(&self) -> bool {
        self.count().await > 0
    }
}

fn by_distance_then_zip(a: &ZipWithDistance, b: &ZipWithDistance) -> Ordering {
    a.distance_miles
        .total_cmp(&b.distance_miles)
        .then_with(|| a.record.zip_code.cmp(&b.record.zip_code))
}
