//! Storage seams for the history service.
//!
//! `HistoryStore` owns browsing rows; `Catalog` is a read-only view of the
//! storefront's products. Both have PostgreSQL and in-memory backends.

use async_trait::async_trait;
use history_core::{
    BrowsingEvent, CategorySummary, ProductSummary, Result, SubcategorySummary, UpsertOutcome,
    UserId, ViewRecord,
};
use std::collections::HashMap;

/// Persistence for browsing events.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert the (user, product) row or bump its count atomically.
    ///
    /// Concurrent calls for the same pair must each add exactly one view.
    async fn upsert_view(&self, view: ViewRecord) -> Result<UpsertOutcome>;

    /// The user's events, most recent first, at most `limit`.
    async fn recent(&self, user_id: UserId, limit: i64) -> Result<Vec<BrowsingEvent>>;

    /// All of the user's events, in no particular order.
    async fn all_for_user(&self, user_id: UserId) -> Result<Vec<BrowsingEvent>>;

    /// Delete one (user, product) row. Returns rows removed (0 or 1).
    async fn delete_one(&self, user_id: UserId, product_id: i64) -> Result<u64>;

    /// Delete all of the user's rows. Returns rows removed.
    async fn delete_all(&self, user_id: UserId) -> Result<u64>;

    /// Check if the store is reachable.
    async fn is_healthy(&self) -> bool;
}

/// Read access to the product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// An active product, or `None` if it is missing or delisted.
    async fn product(&self, id: i64) -> Result<Option<ProductSummary>>;

    /// Products by id, delisted ones included, for enriching existing history.
    async fn products(&self, ids: &[i64]) -> Result<HashMap<i64, ProductSummary>>;

    async fn categories(&self, ids: &[i64]) -> Result<HashMap<i64, CategorySummary>>;

    async fn subcategories(&self, ids: &[i64]) -> Result<HashMap<i64, SubcategorySummary>>;

    /// Number of active products per category.
    async fn active_product_counts(&self, category_ids: &[i64]) -> Result<HashMap<i64, i64>>;
}
