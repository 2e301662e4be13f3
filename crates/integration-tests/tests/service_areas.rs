//! Service-area edits, exact membership and directory search.

#![allow(clippy::unwrap_used)]

use hausbaum_core::{BusinessId, BusinessServiceArea, Category, ZipCode};
use hausbaum_directory::{MemoryStore, ServiceAreaService};
use hausbaum_integration_tests::TestContext;

fn zip(s: &str) -> ZipCode {
    ZipCode::parse(s).unwrap()
}

fn business(s: &str) -> BusinessId {
    BusinessId::parse(s).unwrap()
}

async fn save(service: &ServiceAreaService<MemoryStore>, area: BusinessServiceArea) {
    assert!(service.save(&area).await);
}

#[tokio::test]
async fn test_nationwide_serves_unknown_zip() {
    let ctx = TestContext::seeded().await;
    let area = BusinessServiceArea::nationwide(business("acme"));
    save(&ctx.service_areas, area.clone()).await;

    assert!(ServiceAreaService::<MemoryStore>::is_served_zip(&area, &zip("99999")));
    assert!(ctx.service_areas.is_business_serving(&business("acme"), "99999").await);
    assert_eq!(
        ctx.service_areas.businesses_serving("99999").await,
        vec![business("acme")]
    );
}

#[tokio::test]
async fn test_membership_is_exact() {
    let ctx = TestContext::seeded().await;
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(business("canton-plumbing"), [zip("44718")]),
    )
    .await;

    let b = business("canton-plumbing");
    assert!(ctx.service_areas.is_business_serving(&b, "44718").await);
    assert!(ctx.service_areas.is_business_serving(&b, "44718-0001").await);
    // Next-door ZIP is not served without an explicit radius
    assert!(!ctx.service_areas.is_business_serving(&b, "44719").await);
    assert!(!ctx.service_areas.is_business_serving(&b, "44720").await);
    assert!(!ctx.service_areas.is_business_serving(&b, "nope").await);
}

#[tokio::test]
async fn test_save_supersedes_previous_area() {
    let ctx = TestContext::seeded().await;
    let b = business("b1");
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(b.clone(), [zip("44718"), zip("44720")]),
    )
    .await;
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(b.clone(), [zip("44720")]),
    )
    .await;

    assert!(ctx.service_areas.businesses_serving("44718").await.is_empty());
    assert_eq!(ctx.service_areas.businesses_serving("44720").await, vec![b.clone()]);
    assert_eq!(
        ctx.service_areas.get(&b).await.unwrap().zip_codes.len(),
        1
    );
}

#[tokio::test]
async fn test_serves_near() {
    let ctx = TestContext::seeded().await;
    let area = BusinessServiceArea::with_zip_codes(business("b1"), [zip("44720")]);

    // 44720 is ~3.8 miles from 44718
    assert!(ctx.service_areas.serves_near(&area, "44718", 5.0, 50).await);
    assert!(!ctx.service_areas.serves_near(&area, "44718", 2.0, 50).await);
    // Listed ZIP matches even when the store has no coordinates for it
    let unknown = BusinessServiceArea::with_zip_codes(business("b2"), [zip("44719")]);
    assert!(ctx.service_areas.serves_near(&unknown, "44719", 5.0, 50).await);
    assert!(
        ctx.service_areas
            .serves_near(&BusinessServiceArea::nationwide(business("b3")), "00000", 0.0, 1)
            .await
    );
}

#[tokio::test]
async fn test_find_businesses_exact() {
    let ctx = TestContext::seeded().await;
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(business("local"), [zip("44718")]),
    )
    .await;
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(business("north"), [zip("44720")]),
    )
    .await;
    save(&ctx.service_areas, BusinessServiceArea::nationwide(business("everywhere"))).await;

    let found = ctx.service_areas.find_businesses("44718", None, None, 10).await;
    let ids: Vec<_> = found.iter().map(|m| m.business_id.as_str()).collect();
    assert_eq!(ids, vec!["everywhere", "local"]);
    assert!(found.iter().all(|m| m.distance_miles.abs() < f64::EPSILON));
    assert!(found[0].nationwide);
    assert_eq!(found[0].matched_zip, zip("44718"));
}

#[tokio::test]
async fn test_find_businesses_with_radius_and_category() {
    let ctx = TestContext::seeded().await;
    let local = business("local");
    let north = business("north");
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(local.clone(), [zip("44718")]),
    )
    .await;
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(north.clone(), [zip("44720")]),
    )
    .await;
    assert!(
        ctx.service_areas
            .assign_categories(&local, [Category::HomeLawnLabor])
            .await
    );
    assert!(
        ctx.service_areas
            .assign_categories(&north, [Category::HomeLawnLabor, Category::PetCare])
            .await
    );

    let found = ctx.service_areas.find_businesses("44718", None, Some(10.0), 10).await;
    let ids: Vec<_> = found.iter().map(|m| m.business_id.as_str()).collect();
    assert_eq!(ids, vec!["local", "north"]);
    assert_eq!(found[1].matched_zip, zip("44720"));
    assert!((found[1].distance_miles - 3.8).abs() < 0.2);

    let pets = ctx
        .service_areas
        .find_businesses("44718", Some(Category::PetCare), Some(10.0), 10)
        .await;
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].business_id, north);

    let capped = ctx.service_areas.find_businesses("44718", None, Some(10.0), 1).await;
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].business_id, local);
}

#[tokio::test]
async fn test_delete_clears_listings() {
    let ctx = TestContext::seeded().await;
    let b = business("gone");
    save(
        &ctx.service_areas,
        BusinessServiceArea::with_zip_codes(b.clone(), [zip("33131")]),
    )
    .await;
    assert!(ctx.service_areas.assign_categories(&b, [Category::Lawyers]).await);

    assert!(ctx.service_areas.delete(&b).await);
    assert!(ctx.service_areas.get(&b).await.is_none());
    assert!(ctx.service_areas.businesses_serving("33131").await.is_empty());
    assert!(
        ctx.service_areas
            .categories()
            .businesses_in(Category::Lawyers)
            .await
            .unwrap()
            .is_empty()
    );
}
