//! Command implementations.
//!
//! Every command except `categories` talks to Redis through a
//! [`Context`] built from the environment.

pub mod search;
pub mod service_area;
pub mod zip;

use hausbaum_core::{BusinessId, IdError, ZipCode, ZipCodeError};
use hausbaum_directory::{
    ConfigError, DirectoryConfig, ImportError, LookupError, ProximityResolver, RedisStore,
    ServiceAreaService, StoreError, TimeoutStore,
};
use thiserror::Error;

/// Store used by the CLI: Redis, with every call bounded by the configured
/// timeout.
pub type Store = TimeoutStore<RedisStore>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Redis could not be reached.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A lookup failed.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// Import aborted.
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Invalid ZIP code argument.
    #[error("Invalid ZIP code: {0}")]
    InvalidZip(#[from] ZipCodeError),

    /// Invalid business ID argument.
    #[error("Invalid business ID: {0}")]
    InvalidBusinessId(#[from] IdError),

    /// Invalid argument combination or value.
    #[error("{0}")]
    InvalidArgument(String),
}

/// Shared handles for a command run.
pub struct Context {
    pub config: DirectoryConfig,
    pub resolver: ProximityResolver<Store>,
    pub service_areas: ServiceAreaService<Store>,
}

impl Context {
    /// Load configuration and connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if no Redis URL is configured and
    /// `CliError::Store` if the connection fails.
    pub async fn connect() -> Result<Self, CliError> {
        let config = DirectoryConfig::from_env()?;

        tracing::debug!("Connecting to Redis...");
        let redis = RedisStore::connect(config.require_redis_url()?).await?;
        let store = TimeoutStore::new(redis, config.store_timeout);

        let resolver = ProximityResolver::new(store, &config);
        let service_areas = ServiceAreaService::with_resolver(resolver.clone());

        Ok(Self {
            config,
            resolver,
            service_areas,
        })
    }
}

/// Parse a ZIP argument (ZIP+4 accepted).
pub fn parse_zip(input: &str) -> Result<ZipCode, CliError> {
    Ok(ZipCode::normalize(input)?)
}

/// Parse a business ID argument.
pub fn parse_business(input: &str) -> Result<BusinessId, CliError> {
    Ok(BusinessId::parse(input)?)
}
