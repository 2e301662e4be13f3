//! Radius queries over imported fixture data.

#![allow(clippy::unwrap_used)]

use hausbaum_core::{ZipCode, distance_miles};
use hausbaum_integration_tests::TestContext;

fn zips(results: &[hausbaum_core::ZipWithDistance]) -> Vec<&str> {
    results.iter().map(|r| r.record.zip_code.as_str()).collect()
}

#[tokio::test]
async fn test_miami_neighbors_within_five_miles() {
    let ctx = TestContext::seeded().await;
    let results = ctx.resolver.find_within_radius("33131", 5.0, 100).await;

    assert_eq!(zips(&results), vec!["33131", "33130", "33132"]);
    assert!(results[0].distance_miles.abs() < f64::EPSILON);
    assert!(results.iter().all(|r| r.distance_miles <= 5.0));
}

#[tokio::test]
async fn test_results_are_exactly_filtered() {
    let ctx = TestContext::seeded().await;
    let center = ctx.resolver.lookup("33131").await.unwrap();

    // 33130 is ~0.62 mi away; a 0.5 mi radius must drop it
    let results = ctx.resolver.find_within_radius("33131", 0.5, 100).await;
    assert_eq!(zips(&results), vec!["33131"]);

    for hit in ctx.resolver.find_within_radius("33131", 2000.0, 100).await {
        let expected = distance_miles(
            center.latitude(),
            center.longitude(),
            hit.record.latitude(),
            hit.record.longitude(),
        );
        assert!((hit.distance_miles - expected).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_far_zip_excluded_until_radius_covers_it() {
    let ctx = TestContext::seeded().await;

    let near = ctx.resolver.find_within_radius("33131", 5.0, 100).await;
    assert!(!zips(&near).contains(&"10001"));

    // Canton is ~1,044 miles out, New York ~1,094
    let ohio = ctx.resolver.find_within_radius("33131", 1050.0, 100).await;
    assert!(zips(&ohio).contains(&"44718"));
    assert!(!zips(&ohio).contains(&"10001"));

    let wide = ctx.resolver.find_within_radius("33131", 1100.0, 100).await;
    assert_eq!(wide.len(), 6);
    assert_eq!(wide.last().unwrap().record.zip_code.as_str(), "10001");
}

#[tokio::test]
async fn test_miami_to_new_york() {
    let ctx = TestContext::seeded().await;
    let d = ctx.resolver.distance_between("33131", "10001").await.unwrap();
    assert!((d - 1092.0).abs() < 5.0, "got {d}");
}

#[tokio::test]
async fn test_degenerate_queries() {
    let ctx = TestContext::seeded().await;

    assert!(ctx.resolver.find_within_radius("44719", 50.0, 100).await.is_empty());
    assert!(ctx.resolver.find_within_radius("33131", 5.0, 0).await.is_empty());
    assert_eq!(
        zips(&ctx.resolver.find_within_radius("33131", -3.0, 100).await),
        vec!["33131"]
    );
}

#[tokio::test]
async fn test_typed_errors_for_unknown_center() {
    let ctx = TestContext::seeded().await;
    let err = ctx
        .resolver
        .try_find_within_radius(&ZipCode::parse("44719").unwrap(), 10.0, 10)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_state_and_city_indexes() {
    let ctx = TestContext::seeded().await;
    let zips_repo = ctx.resolver.zip_codes();

    let ohio: Vec<_> = zips_repo
        .zips_in_state("OH", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.zip_code.into_inner())
        .collect();
    assert_eq!(ohio, vec!["44718", "44720"]);

    let north_canton = zips_repo.zips_in_city("North Canton", "OH", 10).await.unwrap();
    assert_eq!(north_canton.len(), 1);
    assert_eq!(north_canton[0].zip_code.as_str(), "44720");
}
