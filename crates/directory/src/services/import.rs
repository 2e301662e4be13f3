//! Bulk ZIP import from CSV.
//!
//! Expected columns (header row required, order free, extras ignored):
//! `zip_code, city, state_name, state_id, county, latitude, longitude, timezone`.
//! The `uszips` spellings `zip`, `county_name`, `lat` and `lng` are accepted
//! as aliases.

use std::io::Read;
use std::path::Path;

use futures::future::join_all;
use hausbaum_core::{Coordinates, ZipCode, ZipRecord};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::DirectoryConfig;
use crate::db::{ImportMetadata, ZipCodeRepository};
use crate::error::LookupError;
use crate::store::KeyValueStore;

/// Failures that abort an import before any row is saved.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV header is missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Counts reported at the end of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Data rows read.
    pub total: usize,
    /// Rows saved.
    pub imported: usize,
    /// Rows rejected as malformed (also counted in `errors`).
    pub skipped: usize,
    /// Rows not imported for any reason: malformed rows plus well-formed
    /// rows the store failed to save. `imported + errors == total`.
    pub errors: usize,
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    zip: usize,
    city: usize,
    state_name: usize,
    state_id: usize,
    county: Option<usize>,
    latitude: usize,
    longitude: usize,
    timezone: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |name: &'static str, aliases: &[&str]| {
            find(&[name])
                .or_else(|| find(aliases))
                .ok_or(ImportError::MissingColumn(name))
        };

        Ok(Self {
            zip: require("zip_code", &["zip"])?,
            city: require("city", &[])?,
            state_name: require("state_name", &[])?,
            state_id: require("state_id", &[])?,
            county: find(&["county", "county_name"]),
            latitude: require("latitude", &["lat"])?,
            longitude: require("longitude", &["lng"])?,
            timezone: find(&["timezone"]),
        })
    }

    fn parse(&self, row: &csv::StringRecord) -> Result<ZipRecord, String> {
        let field = |idx: usize| row.get(idx).map_or("", str::trim);
        let optional = |idx: Option<usize>| idx.map(field).unwrap_or_default().to_owned();
        let non_empty = |idx: usize, name: &str| {
            let value = field(idx);
            if value.is_empty() {
                Err(format!("empty {name}"))
            } else {
                Ok(value.to_owned())
            }
        };
        let number = |idx: usize, name: &str| {
            field(idx)
                .parse::<f64>()
                .map_err(|e| format!("bad {name} {:?}: {e}", field(idx)))
        };

        let zip_code = ZipCode::normalize(field(self.zip)).map_err(|e| e.to_string())?;
        let coordinates = Coordinates::new(
            number(self.latitude, "latitude")?,
            number(self.longitude, "longitude")?,
        )
        .map_err(|e| e.to_string())?;

        Ok(ZipRecord {
            zip_code,
            coordinates,
            city: non_empty(self.city, "city")?,
            state: non_empty(self.state_name, "state_name")?,
            state_code: non_empty(self.state_id, "state_id")?.to_ascii_uppercase(),
            county: optional(self.county),
            timezone: optional(self.timezone),
        })
    }
}

/// Loads ZIP CSV files into the coordinate store.
pub struct ZipImporter<S> {
    zips: ZipCodeRepository<S>,
    batch_size: usize,
}

impl<S: KeyValueStore> ZipImporter<S> {
    /// Create an importer saving through `zips`.
    ///
    /// Pass a clone of the repository the readers use (for example
    /// `resolver.zip_codes().clone()`) so re-imported records replace their
    /// cached copies.
    #[must_use]
    pub fn new(zips: ZipCodeRepository<S>, config: &DirectoryConfig) -> Self {
        Self {
            zips,
            batch_size: config.import_batch_size.max(1),
        }
    }

    /// Override the number of rows saved concurrently.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Import a CSV file.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the file cannot be read or its header is
    /// unusable. Bad rows do not abort the import; they are counted.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn import_path(&self, path: impl AsRef<Path>) -> Result<ImportStats, ImportError> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.import_reader(bytes.as_slice()).await
    }

    /// Import CSV data from any reader.
    ///
    /// Rows are saved in batches; each batch's saves run concurrently and
    /// batches run one after another. On completion the import metadata is
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the header cannot be read or lacks a
    /// required column.
    pub async fn import_reader(&self, reader: impl Read) -> Result<ImportStats, ImportError> {
        let (mut stats, records) = read_rows(reader)?;

        for batch in records.chunks(self.batch_size) {
            let results = join_all(batch.iter().map(|record| self.zips.save(record))).await;
            for (record, result) in batch.iter().zip(results) {
                match result {
                    Ok(()) => stats.imported += 1,
                    Err(e @ LookupError::MalformedRecord(_)) => {
                        stats.skipped += 1;
                        stats.errors += 1;
                        warn!(zip = %record.zip_code, error = %e, "Skipping unstorable ZIP row");
                    }
                    Err(e) => {
                        stats.errors += 1;
                        warn!(zip = %record.zip_code, error = %e, "Failed to save ZIP row");
                    }
                }
            }
        }

        match self.zips.record_import().await {
            Ok(ImportMetadata { count, .. }) => {
                info!(
                    total = stats.total,
                    imported = stats.imported,
                    skipped = stats.skipped,
                    errors = stats.errors,
                    count,
                    "ZIP import complete"
                );
            }
            Err(e) => e.report("record_import"),
        }

        Ok(stats)
    }
}

/// Parse every data row, keeping the valid records and counting the rest.
fn read_rows(reader: impl Read) -> Result<(ImportStats, Vec<ZipRecord>), ImportError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(csv.headers()?)?;
    let mut stats = ImportStats::default();
    let mut records = Vec::new();

    for (idx, row) in csv.records().enumerate() {
        stats.total += 1;
        // Header is line 1
        let line = idx + 2;
        match row.map_err(|e| e.to_string()).and_then(|r| columns.parse(&r)) {
            Ok(record) => records.push(record),
            Err(reason) => {
                stats.skipped += 1;
                stats.errors += 1;
                warn!(line, reason = %reason, "Skipping malformed ZIP row");
            }
        }
    }

    Ok((stats, records))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const CSV: &str = "\
zip,lat,lng,city,state_id,state_name,county_name,timezone,population
33131,25.7697,-80.1892,Miami,FL,Florida,Miami-Dade,America/New_York,3000
10001,40.7501,-73.9964,New York,NY,New York,New York,America/New_York,21000
ABCDE,1,1,Nowhere,ZZ,Nowhere,,,
33130,not-a-number,-80.1988,Miami,FL,Florida,Miami-Dade,America/New_York,
33132,25.7785,-80.1870,,FL,Florida,Miami-Dade,America/New_York,
";

    fn importer() -> ZipImporter<MemoryStore> {
        let config = DirectoryConfig::default();
        ZipImporter::new(ZipCodeRepository::new(MemoryStore::new(), &config), &config)
            .with_batch_size(2)
    }

    #[tokio::test]
    async fn test_import_counts_rows() {
        let importer = importer();
        let stats = importer.import_reader(CSV.as_bytes()).await.unwrap();

        assert_eq!(
            stats,
            ImportStats {
                total: 5,
                imported: 2,
                skipped: 3,
                errors: 3,
            }
        );
        assert_eq!(importer.zips.count().await.unwrap(), 2);
        assert_eq!(importer.zips.metadata().await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_import_twice_keeps_count() {
        let importer = importer();
        importer.import_reader(CSV.as_bytes()).await.unwrap();
        importer.import_reader(CSV.as_bytes()).await.unwrap();
        assert_eq!(importer.zips.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_canonical_headers() {
        let csv = "zip_code,city,state_name,state_id,county,latitude,longitude,timezone\n\
                   44718,Canton,Ohio,oh,Stark,40.8460,-81.4409,America/New_York\n";
        let importer = importer();
        let stats = importer.import_reader(csv.as_bytes()).await.unwrap();
        assert_eq!(stats.imported, 1);

        let record = importer
            .zips
            .get(&ZipCode::parse("44718").unwrap())
            .await
            .unwrap();
        assert_eq!(record.state_code, "OH");
        assert_eq!(record.county, "Stark");
    }

    #[tokio::test]
    async fn test_missing_column_aborts() {
        let csv = "zip,city,state_id\n33131,Miami,FL\n";
        let err = importer().import_reader(csv.as_bytes()).await.unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("state_name")));
    }

    #[tokio::test]
    async fn test_store_outage_counts_errors() {
        let importer = importer();
        importer.zips.store().set_unavailable(true);
        let stats = importer.import_reader(CSV.as_bytes()).await.unwrap();
        assert_eq!(stats.imported, 0);
        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.errors, 5);
        assert_eq!(stats.imported + stats.errors, stats.total);
    }
}
