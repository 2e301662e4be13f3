//! Service-area management commands.
//!
//! # Usage
//!
//! ```bash
//! # Serve two ZIPs, listed under Home Care
//! hb-cli service-area set biz-42 --zip 44718 --zip 44720 --category homecare
//!
//! # Serve everywhere
//! hb-cli service-area set biz-42 --nationwide
//!
//! hb-cli service-area show biz-42
//! hb-cli service-area check biz-42 44721 --near-miles 10
//! hb-cli service-area delete biz-42
//! ```

use std::collections::BTreeSet;

use hausbaum_core::{BusinessServiceArea, Category, ZipCode};

use super::{CliError, Context, parse_business, parse_zip};

/// Replace a business's service area and, if given, its categories.
pub async fn set(
    ctx: &Context,
    business_id: &str,
    nationwide: bool,
    zips: &[String],
    categories: &[String],
) -> Result<(), CliError> {
    let business_id = parse_business(business_id)?;
    if !nationwide && zips.is_empty() {
        return Err(CliError::InvalidArgument(
            "Pass --nationwide or at least one --zip".to_owned(),
        ));
    }

    let zip_codes = zips
        .iter()
        .map(|z| parse_zip(z))
        .collect::<Result<BTreeSet<ZipCode>, _>>()?;
    let categories = categories
        .iter()
        .map(|c| {
            c.parse::<Category>()
                .map_err(|e| CliError::InvalidArgument(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let area = BusinessServiceArea {
        business_id,
        zip_codes,
        is_nationwide: nationwide,
    };

    let areas = ctx.service_areas.areas();
    areas.save(&area).await?;
    tracing::info!(
        "Saved service area for {}: {}",
        area.business_id,
        describe(&area)
    );

    if !categories.is_empty() {
        ctx.service_areas
            .categories()
            .assign(&area.business_id, categories.iter().copied())
            .await?;
        let names: Vec<_> = categories.iter().map(|c| c.display_name()).collect();
        tracing::info!("Listed under: {}", names.join("; "));
    }
    Ok(())
}

/// Show a business's service area and categories.
pub async fn show(ctx: &Context, business_id: &str) -> Result<(), CliError> {
    let business_id = parse_business(business_id)?;

    let Some(area) = ctx.service_areas.areas().get(&business_id).await? else {
        tracing::info!("{business_id} has no service area");
        return Ok(());
    };
    tracing::info!("{business_id}: {}", describe(&area));

    let categories = ctx
        .service_areas
        .categories()
        .categories_of(&business_id)
        .await?;
    for category in categories {
        tracing::info!("  {} ({})", category.display_name(), category.id());
    }
    Ok(())
}

/// Delete a business's service area and category listings.
pub async fn delete(ctx: &Context, business_id: &str) -> Result<(), CliError> {
    let business_id = parse_business(business_id)?;
    ctx.service_areas.areas().delete(&business_id).await?;
    ctx.service_areas.categories().remove(&business_id).await?;
    tracing::info!("Deleted service area for {business_id}");
    Ok(())
}

/// Check whether a business serves a ZIP, optionally within a radius.
pub async fn check(
    ctx: &Context,
    business_id: &str,
    zip: &str,
    near_miles: Option<f64>,
) -> Result<(), CliError> {
    let business_id = parse_business(business_id)?;
    let zip = parse_zip(zip)?;

    let Some(area) = ctx.service_areas.areas().get(&business_id).await? else {
        tracing::info!("{business_id} has no service area");
        return Ok(());
    };

    let served = match near_miles {
        Some(miles) => {
            ctx.service_areas
                .serves_near(&area, zip.as_str(), miles, ctx.resolver.default_limit())
                .await
        }
        None => area.is_served_zip(&zip),
    };

    let scope = near_miles.map_or_else(String::new, |m| format!(" (within {m} mi)"));
    if served {
        tracing::info!("{business_id} serves {zip}{scope}");
    } else {
        tracing::info!("{business_id} does not serve {zip}{scope}");
    }
    Ok(())
}

fn describe(area: &BusinessServiceArea) -> String {
    if area.is_nationwide {
        return "nationwide".to_owned();
    }
    let zips: Vec<_> = area.zip_codes.iter().map(ZipCode::as_str).collect();
    format!("{} ZIP codes [{}]", zips.len(), zips.join(", "))
}
