//! Directory search commands.

use hausbaum_core::{Category, format_distance};

use super::{CliError, Context};

/// Find businesses serving a ZIP.
pub async fn search(
    ctx: &Context,
    zip: &str,
    category: Option<&str>,
    miles: Option<f64>,
    limit: usize,
) -> Result<(), CliError> {
    let category = category
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let zip = super::parse_zip(zip)?;

    let matches = ctx
        .service_areas
        .find_businesses(zip.as_str(), category, miles, limit)
        .await;

    if matches.is_empty() {
        tracing::info!("No businesses found for {zip}");
        return Ok(());
    }

    tracing::info!("{} businesses serving {zip}:", matches.len());
    for m in &matches {
        if m.nationwide {
            tracing::info!("  {}  (nationwide)", m.business_id);
        } else {
            tracing::info!(
                "  {}  via {} ({})",
                m.business_id,
                m.matched_zip,
                format_distance(m.distance_miles)
            );
        }
    }
    Ok(())
}

/// List every category with its ID and page path.
pub fn categories() {
    for category in Category::ALL {
        tracing::info!(
            "{:<24} {:<26} {}",
            category.id(),
            category.page_path(),
            category.display_name()
        );
    }
}
