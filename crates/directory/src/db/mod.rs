//! Repositories over the key-value store.
//!
//! # Keys
//!
//! ## ZIP data
//!
//! - `zip:data:<zip>` - hash: city, state, county, timezone, stateCode
//! - `zip:geo` - geo index, member = ZIP
//! - `zip:index:state:<CODE>` - set of ZIPs in a state
//! - `zip:index:city:<city>_<code>` - set of ZIPs in a city (lowercase)
//! - `zip:meta` - JSON `{count, lastUpdated}` of the last import
//!
//! ## Businesses
//!
//! - `business:<id>:serviceArea` - JSON service-area document
//! - `business:<id>:zipcodes` - set of explicitly served ZIPs
//! - `zipcode:<zip>:businesses` - reverse index, ZIP to businesses
//! - `businesses:nationwide` - set of nationwide businesses
//! - `business:<id>:categories` - set of category IDs
//! - `category:<id>:businesses` - set of businesses in a category

mod categories;
mod service_areas;
mod zip_codes;

pub use categories::CategoryRepository;
pub use service_areas::ServiceAreaRepository;
pub use zip_codes::{ImportMetadata, ZipCache, ZipCodeRepository, zip_cache};

use hausbaum_core::{BusinessId, ZipCode};

pub(crate) const ZIP_GEO_KEY: &str = "zip:geo";
pub(crate) const ZIP_META_KEY: &str = "zip:meta";
pub(crate) const NATIONWIDE_KEY: &str = "businesses:nationwide";

pub(crate) fn zip_data_key(zip: &ZipCode) -> String {
    format!("zip:data:{zip}")
}

pub(crate) fn state_index_key(state_code: &str) -> String {
    format!("zip:index:state:{}", state_code.trim().to_ascii_uppercase())
}

pub(crate) fn city_index_key(city: &str, state_code: &str) -> String {
    format!(
        "zip:index:city:{}_{}",
        city.trim().to_lowercase(),
        state_code.trim().to_ascii_lowercase()
    )
}

pub(crate) fn service_area_key(business: &BusinessId) -> String {
    format!("business:{business}:serviceArea")
}

pub(crate) fn business_zips_key(business: &BusinessId) -> String {
    format!("business:{business}:zipcodes")
}

pub(crate) fn zip_businesses_key(zip: &ZipCode) -> String {
    format!("zipcode:{zip}:businesses")
}

pub(crate) fn business_categories_key(business: &BusinessId) -> String {
    format!("business:{business}:categories")
}

/// Parse set members that should be ZIP codes, dropping (and logging) any
/// that are not.
pub(crate) fn parse_zip_members(key: &str, members: Vec<String>) -> Vec<ZipCode> {
    members
        .into_iter()
        .filter_map(|member| match ZipCode::parse(&member) {
            Ok(zip) => Some(zip),
            Err(e) => {
                tracing::warn!(key, member = %member, error = %e, "Skipping invalid ZIP member");
                None
            }
        })
        .collect()
}

/// Parse set members that should be business IDs, dropping (and logging) any
/// that are not.
pub(crate) fn parse_business_members(key: &str, members: Vec<String>) -> Vec<BusinessId> {
    members
        .into_iter()
        .filter_map(|member| match BusinessId::parse(&member) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(key, member = %member, error = %e, "Skipping invalid business member");
                None
            }
        })
        .collect()
}
