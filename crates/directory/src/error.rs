//! Lookup error taxonomy.
//!
//! Repositories return [`LookupError`]; the service layer logs it with
//! [`LookupError::report`] and falls back to an empty answer.

use thiserror::Error;

use crate::store::StoreError;

/// Why a lookup produced no answer.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The key does not exist, or only half of a ZIP record exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store failed or timed out. Transient; retrying may succeed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A stored value could not be decoded into its domain type.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl LookupError {
    /// Whether this error means the data is absent, as opposed to unreadable.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Log the error at a level matching its kind.
    ///
    /// Absent and malformed data are `warn`; store outages are `error`.
    pub fn report(&self, operation: &'static str) {
        match self {
            Self::NotFound(_) | Self::MalformedRecord(_) => {
                tracing::warn!(operation, error = %self, "Lookup returned no data");
            }
            Self::StoreUnavailable(_) => {
                tracing::error!(operation, error = %self, "Store unavailable");
            }
        }
    }
}
