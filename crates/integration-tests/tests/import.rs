//! CSV import behavior.

#![allow(clippy::unwrap_used)]

use hausbaum_core::ZipCode;
use hausbaum_integration_tests::{FIXTURE_CSV, FIXTURE_ROWS, TestContext};

#[tokio::test]
async fn test_fixture_import_stats() {
    let ctx = TestContext::new();
    assert!(!ctx.resolver.is_initialized().await);

    let stats = ctx.import_fixture().await;
    assert_eq!(stats.total, FIXTURE_ROWS);
    assert_eq!(stats.imported, FIXTURE_ROWS);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.errors, 0);

    assert!(ctx.resolver.is_initialized().await);
    assert_eq!(ctx.resolver.count().await, FIXTURE_ROWS as u64);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let ctx = TestContext::seeded().await;
    let before = ctx.resolver.count().await;
    let record_before = ctx.resolver.lookup("44718").await.unwrap();

    ctx.import_fixture().await;

    assert_eq!(ctx.resolver.count().await, before);
    assert_eq!(ctx.resolver.lookup("44718").await.unwrap(), record_before);
    assert_eq!(
        ctx.resolver
            .zip_codes()
            .zips_in_state("FL", 100)
            .await
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn test_save_then_get_round_trip() {
    let ctx = TestContext::seeded().await;
    let record = ctx
        .resolver
        .zip_codes()
        .get(&ZipCode::parse("33131").unwrap())
        .await
        .unwrap();

    assert_eq!(record.city, "Miami");
    assert_eq!(record.state, "Florida");
    assert_eq!(record.state_code, "FL");
    assert_eq!(record.county, "Miami-Dade");
    assert_eq!(record.timezone, "America/New_York");
    assert!((record.latitude() - 25.7697).abs() < 1e-4);
    assert!((record.longitude() - -80.1892).abs() < 1e-4);
}

#[tokio::test]
async fn test_malformed_rows_are_skipped() {
    let ctx = TestContext::new();
    let csv = format!(
        "{FIXTURE_CSV}\
         9021,34.09,-118.41,Beverly Hills,CA,California,Los Angeles,America/Los_Angeles\n\
         90210,,-118.41,Beverly Hills,CA,California,Los Angeles,America/Los_Angeles\n\
         90210,134.09,-118.41,Beverly Hills,CA,California,Los Angeles,America/Los_Angeles\n\
         99723,89.5,-156.78,Nowhere,AK,Alaska,North Slope,America/Anchorage\n"
    );

    let stats = ctx
        .importer()
        .import_reader(csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(stats.total, FIXTURE_ROWS + 4);
    assert_eq!(stats.imported, FIXTURE_ROWS);
    assert_eq!(stats.skipped, 4);
    assert_eq!(stats.errors, 4);
    assert_eq!(ctx.resolver.count().await, FIXTURE_ROWS as u64);
}

#[tokio::test]
async fn test_import_metadata_recorded() {
    let ctx = TestContext::seeded().await;
    let meta = ctx
        .resolver
        .zip_codes()
        .metadata()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meta.count, FIXTURE_ROWS as u64);

    let json = serde_json::to_value(&meta).unwrap();
    assert!(json["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_zip_plus_four_lookup() {
    let ctx = TestContext::seeded().await;
    assert!(ctx.resolver.validate("44718-1234").await.is_valid());
    assert_eq!(
        ctx.resolver.city_state(" 44720 ").await,
        Some(("North Canton".to_owned(), "Ohio".to_owned()))
    );
}
