//! End-to-end tests for the browsing history endpoints.
//!
//! Runs the real router over in-memory backends:
//! HTTP → AuthContext (mock gateway) → BrowsingHistoryService → MemoryHistoryStore

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, bearer, demo},
    setup::TestContext,
};
use serde_json::Value;
use std::time::Duration;

async fn pause() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}

/// track → track → clear one → list, as a shopper would.
#[tokio::test]
async fn test_track_twice_then_clear_scenario() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/browsing-history/track/")
        .add_header("Authorization", &bearer(1))
        .json(&fixtures::track_body(demo::KING_BED))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Browsing history tracked successfully");
    assert_eq!(body["created"], true);
    assert_eq!(body["data"]["view_count"], 1);
    assert_eq!(body["data"]["product"]["id"], demo::KING_BED);
    assert_eq!(body["data"]["category"]["slug"], "beds");

    pause().await;
    let response = server
        .post("/browsing-history/track/")
        .add_header("Authorization", &bearer(1))
        .json(&fixtures::track_body(demo::KING_BED))
        .await;
    response.assert_status(StatusCode::CREATED);
    let again: Value = response.json();
    assert_eq!(again["created"], false);
    assert_eq!(again["data"]["view_count"], 2);
    assert_eq!(again["data"]["id"], body["data"]["id"]);
    assert_eq!(again["data"]["first_viewed_at"], body["data"]["first_viewed_at"]);
    assert_ne!(again["data"]["last_viewed_at"], body["data"]["last_viewed_at"]);

    let response = server
        .delete("/browsing-history/clear/")
        .add_query_param("product_id", demo::KING_BED)
        .add_header("Authorization", &bearer(1))
        .await;
    response.assert_status_ok();
    let cleared: Value = response.json();
    assert_eq!(cleared["message"], "Cleared 1 item(s) from browsing history");
    assert_eq!(cleared["cleared"], 1);

    let response = server
        .get("/browsing-history/")
        .add_header("Authorization", &bearer(1))
        .await;
    response.assert_status_ok();
    let listed: Value = response.json();
    assert_eq!(listed["count"], 0);
    assert_eq!(listed["results"], Value::Array(vec![]));
}

/// Listing is most recent first and respects `limit`.
#[tokio::test]
async fn test_list_most_recent_first_with_limit() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for product_id in [demo::SOFA_3_SEATER, demo::RECLINER, demo::QUEEN_BED] {
        server
            .post("/browsing-history/track")
            .add_header("Authorization", &bearer(7))
            .json(&fixtures::track_body(product_id))
            .await
            .assert_status(StatusCode::CREATED);
        pause().await;
    }

    let listed: Value = server
        .get("/browsing-history")
        .add_header("Authorization", &bearer(7))
        .await
        .json();
    let ids: Vec<i64> = listed["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["product"]["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![demo::QUEEN_BED, demo::RECLINER, demo::SOFA_3_SEATER]);

    let limited: Value = server
        .get("/browsing-history/")
        .add_query_param("limit", 2)
        .add_header("Authorization", &bearer(7))
        .await
        .json();
    assert_eq!(limited["count"], 2);
    assert_eq!(limited["results"][0]["product"]["id"], demo::QUEEN_BED);
}

/// A string product id is accepted.
#[tokio::test]
async fn test_track_accepts_numeric_string() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/browsing-history/track/")
        .add_header("Authorization", &bearer(3))
        .json(&fixtures::track_body_string("2"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["product"]["id"], demo::SOFA_2_SEATER);
    assert_eq!(body["data"]["subcategory"]["name"], "2-Seater");
}

/// Category roll-up sums views and counts distinct products.
#[tokio::test]
async fn test_categories_aggregate() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for product_id in [
        demo::SOFA_3_SEATER,
        demo::SOFA_3_SEATER,
        demo::SOFA_2_SEATER,
        demo::QUEEN_BED,
    ] {
        server
            .post("/browsing-history/track/")
            .add_header("Authorization", &bearer(4))
            .json(&fixtures::track_body(product_id))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .get("/browsing-history/categories/")
        .add_header("Authorization", &bearer(4))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["count"], 2);
    let sofas = &body["results"][0];
    assert_eq!(sofas["name"], "Sofas");
    assert_eq!(sofas["view_count"], 3);
    assert_eq!(sofas["browsed_product_count"], 2);
    assert_eq!(sofas["product_count"], 2);

    let beds = &body["results"][1];
    assert_eq!(beds["slug"], "beds");
    assert_eq!(beds["view_count"], 1);
    assert_eq!(beds["browsed_product_count"], 1);
}

/// Clearing without a product id removes only the caller's rows.
#[tokio::test]
async fn test_clear_all_is_scoped_to_user() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for (user, product_id) in [(1, demo::SOFA_3_SEATER), (1, demo::RECLINER), (2, demo::RECLINER)] {
        server
            .post("/browsing-history/track/")
            .add_header("Authorization", &bearer(user))
            .json(&fixtures::track_body(product_id))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let cleared: Value = server
        .delete("/browsing-history/clear")
        .add_header("Authorization", &bearer(1))
        .await
        .json();
    assert_eq!(cleared["cleared"], 2);
    assert_eq!(cleared["message"], "Cleared 2 item(s) from browsing history");

    let other: Value = server
        .get("/browsing-history/")
        .add_header("Authorization", &bearer(2))
        .await
        .json();
    assert_eq!(other["count"], 1);
}

/// Clearing a product that was never viewed reports zero.
#[tokio::test]
async fn test_clear_missing_item_reports_zero() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let cleared: Value = server
        .delete("/browsing-history/clear/")
        .add_query_param("product_id", demo::RECLINER)
        .add_header("Authorization", &bearer(9))
        .await
        .json();
    assert_eq!(cleared["cleared"], 0);
    assert_eq!(cleared["message"], "Cleared 0 item(s) from browsing history");
}

/// Concurrent tracks of one product all count.
#[tokio::test]
async fn test_concurrent_tracks_are_not_lost() {
    let ctx = TestContext::new();
    let user = history_core::UserId(11);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = ctx.service.clone();
        handles.push(tokio::spawn(async move {
            service.track(user, demo::RECLINER).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("track failed");
    }

    let listed: Value = ctx
        .server()
        .get("/browsing-history/")
        .add_header("Authorization", &bearer(11))
        .await
        .json();
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["results"][0]["view_count"], 20);
}

/// A product delisted after viewing stays in the history listing.
#[tokio::test]
async fn test_delisted_product_stays_listed() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/browsing-history/track/")
        .add_header("Authorization", &bearer(5))
        .json(&fixtures::track_body(demo::QUEEN_BED))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.catalog.deactivate_product(demo::QUEEN_BED);

    let listed: Value = server
        .get("/browsing-history/")
        .add_header("Authorization", &bearer(5))
        .await
        .json();
    assert_eq!(listed["count"], 1);

    server
        .post("/browsing-history/track/")
        .add_header("Authorization", &bearer(5))
        .json(&fixtures::track_body(demo::QUEEN_BED))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
