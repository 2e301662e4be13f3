//! ZIP data commands.
//!
//! # Usage
//!
//! ```bash
//! hb-cli zip import data/uszips.csv --batch-size 200
//! hb-cli zip get 33131
//! hb-cli zip radius 33131 --miles 5 --limit 20
//! hb-cli zip distance 33131 10001
//! hb-cli zip count
//! hb-cli zip state OH --city Canton
//! ```

use std::path::Path;

use hausbaum_core::{ZipRecord, ZipWithDistance, format_distance};
use hausbaum_directory::{LookupError, ZipImporter};

use super::{CliError, Context, parse_zip};

/// Import a ZIP CSV file.
pub async fn import(ctx: &Context, path: &Path, batch_size: Option<usize>) -> Result<(), CliError> {
    let mut importer = ZipImporter::new(ctx.resolver.zip_codes().clone(), &ctx.config);
    if let Some(batch_size) = batch_size {
        if batch_size == 0 {
            return Err(CliError::InvalidArgument(
                "--batch-size must be at least 1".to_owned(),
            ));
        }
        importer = importer.with_batch_size(batch_size);
    }

    tracing::info!("Importing ZIP codes from {}...", path.display());
    let stats = importer.import_path(path).await?;

    tracing::info!(
        "Import complete: {} rows, {} imported, {} skipped, {} errors",
        stats.total,
        stats.imported,
        stats.skipped,
        stats.errors
    );
    Ok(())
}

/// Show one ZIP record.
pub async fn get(ctx: &Context, zip: &str) -> Result<(), CliError> {
    let zip = parse_zip(zip)?;
    let record = ctx.resolver.zip_codes().get(&zip).await?;
    log_record(&record);
    Ok(())
}

/// List ZIPs within a radius, nearest first.
pub async fn radius(
    ctx: &Context,
    zip: &str,
    miles: f64,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let zip = parse_zip(zip)?;
    let limit = limit.unwrap_or_else(|| ctx.resolver.default_limit());

    let results = unknown_center_is_empty(
        ctx.resolver
            .try_find_within_radius(&zip, miles, limit)
            .await,
    )?;

    tracing::info!("{} ZIP codes within {miles} mi of {zip}:", results.len());
    for hit in &results {
        tracing::info!(
            "  {}  {:>9}  {}, {}",
            hit.record.zip_code,
            format_distance(hit.distance_miles),
            hit.record.city,
            hit.record.state_code
        );
    }
    Ok(())
}

/// Distance between two ZIP centroids.
pub async fn distance(ctx: &Context, from: &str, to: &str) -> Result<(), CliError> {
    let from = parse_zip(from)?;
    let to = parse_zip(to)?;

    let a = ctx.resolver.zip_codes().get(&from).await?;
    let b = ctx.resolver.zip_codes().get(&to).await?;

    tracing::info!("{from} -> {to}: {}", format_distance(a.distance_to(&b)));
    Ok(())
}

/// Number of stored ZIPs and the last import time.
pub async fn count(ctx: &Context) -> Result<(), CliError> {
    let zips = ctx.resolver.zip_codes();
    let count = zips.count().await?;

    match zips.metadata().await? {
        Some(meta) => tracing::info!(
            "{count} ZIP codes stored (last import {}, {} at the time)",
            meta.last_updated.to_rfc3339(),
            meta.count
        ),
        None if count == 0 => tracing::info!("ZIP database is not initialized"),
        None => tracing::info!("{count} ZIP codes stored (no import metadata)"),
    }
    Ok(())
}

/// List ZIPs in a state, or one city of it.
pub async fn state(
    ctx: &Context,
    state_code: &str,
    city: Option<&str>,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let limit = limit.unwrap_or_else(|| ctx.resolver.default_limit());
    let zips = ctx.resolver.zip_codes();

    let records = match city {
        Some(city) => zips.zips_in_city(city, state_code, limit).await?,
        None => zips.zips_in_state(state_code, limit).await?,
    };

    tracing::info!("{} ZIP codes:", records.len());
    for record in &records {
        tracing::info!("  {}  {}, {}", record.zip_code, record.city, record.state_code);
    }
    Ok(())
}

/// An unknown center ZIP has no neighbors; only store failures are errors.
fn unknown_center_is_empty(
    result: Result<Vec<ZipWithDistance>, LookupError>,
) -> Result<Vec<ZipWithDistance>, CliError> {
    match result {
        Ok(results) => Ok(results),
        Err(LookupError::NotFound(zip)) => {
            tracing::debug!("Center ZIP {zip} is not in the store");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn log_record(record: &ZipRecord) {
    tracing::info!("ZIP:       {}", record.zip_code);
    tracing::info!("City:      {}", record.city);
    tracing::info!("State:     {} ({})", record.state, record.state_code);
    tracing::info!("County:    {}", record.county);
    tracing::info!("Timezone:  {}", record.timezone);
    tracing::info!(
        "Centroid:  {:.4}, {:.4}",
        record.latitude(),
        record.longitude()
    );
}
