//! PostgreSQL store tests.
//!
//! Skipped unless `STOREFRONT_TEST_DATABASE_URL` is set or
//! `STOREFRONT_TEST_DOCKER=1` allows starting a container. All checks run in
//! one test so they share the seeded database without racing on it.

use chrono::{Duration, Utc};
use history_core::{ListParams, UserId, ViewRecord};
use history_store::{health::check_connection, Catalog, HistoryStore};
use integration_tests::{fixtures::demo, setup::PgTestContext};
use std::sync::Arc;

fn view(user: i64, product: i64, category: Option<i64>) -> ViewRecord {
    ViewRecord {
        user_id: UserId(user),
        product_id: product,
        category_id: category,
        subcategory_id: None,
        viewed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_postgres_store() {
    let Some(ctx) = PgTestContext::start().await else {
        eprintln!("skipping: no test database configured");
        return;
    };

    assert!(check_connection(&ctx.client).await);

    upsert_creates_then_increments(&ctx).await;
    upsert_keeps_existing_category(&ctx).await;
    concurrent_upserts_are_not_lost(&ctx).await;
    unknown_product_is_not_found(&ctx).await;
    recent_orders_and_limits(&ctx).await;
    deletes_are_scoped(&ctx).await;
    catalog_lookups(&ctx).await;
    service_round_trip(&ctx).await;
}

async fn upsert_creates_then_increments(ctx: &PgTestContext) {
    let first = ctx
        .history
        .upsert_view(view(100, demo::SOFA_3_SEATER, Some(1)))
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.event.view_count, 1);
    assert_eq!(first.event.first_viewed_at, first.event.last_viewed_at);

    let mut again = view(100, demo::SOFA_3_SEATER, Some(1));
    again.viewed_at = first.event.last_viewed_at + Duration::seconds(5);
    let second = ctx.history.upsert_view(again).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.event.id, first.event.id);
    assert_eq!(second.event.view_count, 2);
    assert_eq!(second.event.first_viewed_at, first.event.first_viewed_at);
    assert!(second.event.last_viewed_at > first.event.last_viewed_at);
}

async fn upsert_keeps_existing_category(ctx: &PgTestContext) {
    ctx.history
        .upsert_view(view(101, demo::RECLINER, None))
        .await
        .unwrap();
    let filled = ctx
        .history
        .upsert_view(view(101, demo::RECLINER, Some(2)))
        .await
        .unwrap();
    assert_eq!(filled.event.category_id, Some(2));

    let kept = ctx
        .history
        .upsert_view(view(101, demo::RECLINER, Some(3)))
        .await
        .unwrap();
    assert_eq!(kept.event.category_id, Some(2));
}

async fn concurrent_upserts_are_not_lost(ctx: &PgTestContext) {
    let store: Arc<dyn HistoryStore> = ctx.history.clone();
    let mut handles = Vec::new();
    for _ in 0..30 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.upsert_view(view(102, demo::KING_BED, Some(3))).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().created {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let events = ctx.history.all_for_user(UserId(102)).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].view_count, 30);
}

async fn unknown_product_is_not_found(ctx: &PgTestContext) {
    let err = ctx
        .history
        .upsert_view(view(103, demo::MISSING, None))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND_001");
    assert!(ctx.history.all_for_user(UserId(103)).await.unwrap().is_empty());
}

async fn recent_orders_and_limits(ctx: &PgTestContext) {
    let base = Utc::now();
    for (offset, product) in [(0, demo::SOFA_3_SEATER), (2, demo::SOFA_2_SEATER), (1, demo::RECLINER)] {
        let mut v = view(104, product, None);
        v.viewed_at = base + Duration::seconds(offset);
        ctx.history.upsert_view(v).await.unwrap();
    }

    let recent = ctx.history.recent(UserId(104), 2).await.unwrap();
    let products: Vec<i64> = recent.iter().map(|e| e.product_id).collect();
    assert_eq!(products, vec![demo::SOFA_2_SEATER, demo::RECLINER]);
}

async fn deletes_are_scoped(ctx: &PgTestContext) {
    for (user, product) in [(105, demo::SOFA_3_SEATER), (105, demo::RECLINER), (106, demo::SOFA_3_SEATER)] {
        ctx.history.upsert_view(view(user, product, None)).await.unwrap();
    }

    assert_eq!(ctx.history.delete_one(UserId(105), demo::SOFA_3_SEATER).await.unwrap(), 1);
    assert_eq!(ctx.history.delete_one(UserId(105), demo::SOFA_3_SEATER).await.unwrap(), 0);
    assert_eq!(ctx.history.delete_all(UserId(105)).await.unwrap(), 1);
    assert_eq!(ctx.history.all_for_user(UserId(106)).await.unwrap().len(), 1);
}

async fn catalog_lookups(ctx: &PgTestContext) {
    let product = ctx.catalog.product(demo::SOFA_3_SEATER).await.unwrap().unwrap();
    assert_eq!(product.slug, "aurora-3-seater");
    assert_eq!(product.price, "32999.00");
    assert_eq!(product.category_id, 1);
    assert_eq!(product.subcategory_id, Some(1));
    assert!(ctx.catalog.product(demo::MISSING).await.unwrap().is_none());

    let products = ctx.catalog.products(&[1, 2, demo::MISSING]).await.unwrap();
    assert_eq!(products.len(), 2);

    let categories = ctx.catalog.categories(&[1, 3]).await.unwrap();
    assert_eq!(categories[&1].name, "Sofas");
    assert_eq!(categories[&3].slug, "beds");

    let subcategories = ctx.catalog.subcategories(&[2]).await.unwrap();
    assert_eq!(subcategories[&2].name, "2-Seater");

    let counts = ctx.catalog.active_product_counts(&[1, 2, 3]).await.unwrap();
    assert_eq!(counts.get(&1), Some(&2));
    assert_eq!(counts.get(&2), Some(&1));
    assert_eq!(counts.get(&3), Some(&2));

    sqlx::query("UPDATE products_product SET is_active = FALSE WHERE id = $1")
        .bind(demo::QUEEN_BED)
        .execute(ctx.client.pool())
        .await
        .unwrap();
    assert!(ctx.catalog.product(demo::QUEEN_BED).await.unwrap().is_none());
    assert!(ctx
        .catalog
        .products(&[demo::QUEEN_BED])
        .await
        .unwrap()
        .contains_key(&demo::QUEEN_BED));
    let counts = ctx.catalog.active_product_counts(&[3]).await.unwrap();
    assert_eq!(counts.get(&3), Some(&1));

    sqlx::query("UPDATE products_product SET is_active = TRUE WHERE id = $1")
        .bind(demo::QUEEN_BED)
        .execute(ctx.client.pool())
        .await
        .unwrap();
}

async fn service_round_trip(ctx: &PgTestContext) {
    let user = UserId(107);

    let first = ctx.service.track(user, demo::SOFA_2_SEATER).await.unwrap();
    assert!(first.created);
    assert_eq!(first.entry.subcategory.map(|s| s.name), Some("2-Seater".to_string()));

    let second = ctx.service.track(user, demo::SOFA_2_SEATER).await.unwrap();
    assert_eq!(second.entry.view_count, 2);

    ctx.service.track(user, demo::QUEEN_BED).await.unwrap();

    let listed = ctx.service.list(user, &ListParams::default()).await.unwrap();
    assert_eq!(listed.len(), 2);

    let activity = ctx.service.aggregate_categories(user).await.unwrap();
    assert_eq!(activity[0].name, "Sofas");
    assert_eq!(activity[0].view_count, 2);
    assert_eq!(activity[0].product_count, 2);

    assert!(ctx.service.track(user, demo::MISSING).await.is_err());
    assert_eq!(ctx.service.clear(user, None).await.unwrap(), 2);
}
