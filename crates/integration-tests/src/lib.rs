//! Integration tests for the Hausbaum directory.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store (no services needed)
//! cargo test -p hausbaum-integration-tests
//!
//! # Include the Redis-backed tests
//! HAUSBAUM_REDIS_URL=redis://localhost:6379/15 \
//!     cargo test -p hausbaum-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `radius` - Radius queries over imported ZIP data
//! - `import` - CSV import and re-import
//! - `service_areas` - Service-area edits, membership and search
//! - `store_failures` - Degraded behavior when the store fails or stalls
//! - `redis` - The same flows against a live Redis (ignored by default)

use std::time::Duration;

use hausbaum_directory::{
    DirectoryConfig, ImportStats, KeyValueStore, MemoryStore, ProximityResolver,
    ServiceAreaService, TimeoutStore, ZipImporter,
};

/// Fixture ZIP centroids in `uszips` CSV layout.
///
/// 33130 and 33132 are each within a mile of 33131; 10001 is ~1,094 miles
/// away. 44718 and 44720 are ~3.8 miles apart. 44719 is deliberately absent.
pub const FIXTURE_CSV: &str = "\
zip,lat,lng,city,state_id,state_name,county_name,timezone
33131,25.7697,-80.1892,Miami,FL,Florida,Miami-Dade,America/New_York
33130,25.7672,-80.1988,Miami,FL,Florida,Miami-Dade,America/New_York
33132,25.7785,-80.1870,Miami,FL,Florida,Miami-Dade,America/New_York
10001,40.7501,-73.9964,New York,NY,New York,New York,America/New_York
44718,40.8460,-81.4409,Canton,OH,Ohio,Stark,America/New_York
44720,40.9010,-81.4330,North Canton,OH,Ohio,Stark,America/New_York
";

/// Number of data rows in [`FIXTURE_CSV`].
pub const FIXTURE_ROWS: usize = 6;

/// Directory components wired to one shared store.
pub struct TestContext<S: KeyValueStore> {
    pub store: S,
    pub config: DirectoryConfig,
    pub resolver: ProximityResolver<S>,
    pub service_areas: ServiceAreaService<S>,
}

impl<S: KeyValueStore> TestContext<S> {
    /// Wire the components over `store`.
    pub fn with_store(store: S) -> Self {
        let config = DirectoryConfig::default();
        let resolver = ProximityResolver::new(store.clone(), &config);
        let service_areas = ServiceAreaService::with_resolver(resolver.clone());
        Self {
            store,
            config,
            resolver,
            service_areas,
        }
    }

    /// An importer writing through this context's resolver (sharing its
    /// cache).
    pub fn importer(&self) -> ZipImporter<S> {
        ZipImporter::new(self.resolver.zip_codes().clone(), &self.config)
    }

    /// Import [`FIXTURE_CSV`].
    ///
    /// # Panics
    ///
    /// Panics if the fixture cannot be imported.
    #[allow(clippy::unwrap_used)]
    pub async fn import_fixture(&self) -> ImportStats {
        self.importer()
            .import_reader(FIXTURE_CSV.as_bytes())
            .await
            .unwrap()
    }
}

impl TestContext<MemoryStore> {
    /// Fresh in-memory context with nothing imported.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Fresh in-memory context with the fixture ZIPs imported.
    pub async fn seeded() -> Self {
        let ctx = Self::new();
        ctx.import_fixture().await;
        ctx
    }
}

impl Default for TestContext<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory store whose every call is bounded by `timeout`.
pub fn bounded_memory_store(timeout: Duration) -> (MemoryStore, TimeoutStore<MemoryStore>) {
    let memory = MemoryStore::new();
    let bounded = TimeoutStore::new(memory.clone(), timeout);
    (memory, bounded)
}
