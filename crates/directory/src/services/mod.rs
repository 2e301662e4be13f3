//! Component entry points.
//!
//! - [`ProximityResolver`] - ZIP lookups and radius queries
//! - [`ServiceAreaService`] - service-area membership and business search
//! - [`ZipImporter`] - CSV bulk import

mod import;
mod proximity;
mod service_area;

pub use import::{ImportError, ImportStats, ZipImporter};
pub use proximity::{ProximityResolver, ZipValidation};
pub use service_area::{BusinessMatch, ServiceAreaService};
