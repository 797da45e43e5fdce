//! Browsing history types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use validator::Validate;

use crate::auth::UserId;
use crate::catalog::{CategorySummary, ProductSummary, SubcategorySummary};
use crate::error::{Error, Result};
use crate::limits::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// One user's view record for one product.
///
/// At most one exists per (user_id, product_id); repeated views bump
/// `view_count` and `last_viewed_at` instead of adding rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsingEvent {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: i64,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub view_count: i64,
    pub first_viewed_at: DateTime<Utc>,
    pub last_viewed_at: DateTime<Utc>,
}

impl BrowsingEvent {
    /// Most recently viewed first, newer rows first on equal timestamps.
    pub fn recency_order(a: &Self, b: &Self) -> Ordering {
        b.last_viewed_at
            .cmp(&a.last_viewed_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Sort events the way the history listing returns them.
pub fn sort_by_recency(events: &mut [BrowsingEvent]) {
    events.sort_by(BrowsingEvent::recency_order);
}

/// Input to an upsert: the view being recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRecord {
    pub user_id: UserId,
    pub product_id: i64,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub viewed_at: DateTime<Utc>,
}

impl ViewRecord {
    /// A view of `product` by `user_id`, categories copied from the product.
    pub fn for_product(user_id: UserId, product: &ProductSummary, viewed_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            product_id: product.id,
            category_id: Some(product.category_id),
            subcategory_id: product.subcategory_id,
            viewed_at,
        }
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub event: BrowsingEvent,
    /// True when this call inserted the row.
    pub created: bool,
}

/// A history row enriched with catalog summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub product: ProductSummary,
    pub category: Option<CategorySummary>,
    pub subcategory: Option<SubcategorySummary>,
    pub view_count: i64,
    pub first_viewed_at: DateTime<Utc>,
    pub last_viewed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        event: &BrowsingEvent,
        product: ProductSummary,
        category: Option<CategorySummary>,
        subcategory: Option<SubcategorySummary>,
    ) -> Self {
        Self {
            id: event.id,
            product,
            category,
            subcategory,
            view_count: event.view_count,
            first_viewed_at: event.first_viewed_at,
            last_viewed_at: event.last_viewed_at,
        }
    }
}

/// Result of a track call.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedView {
    pub entry: HistoryEntry,
    pub created: bool,
}

/// Per-category roll-up of a user's browsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryActivity {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    /// Active products the catalog lists in this category.
    pub product_count: i64,
    /// Distinct products the user viewed in this category.
    pub browsed_product_count: i64,
    /// Sum of the user's view counts in this category.
    pub view_count: i64,
    pub last_viewed_at: DateTime<Utc>,
}

/// Query parameters for the history listing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListParams {
    #[validate(range(min = 1))]
    pub limit: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListParams {
    /// Parse the raw `limit` query value; absent means `default_limit`.
    pub fn from_query(limit: Option<&str>, default_limit: i64) -> Result<Self> {
        let params = match limit.map(str::trim) {
            None | Some("") => Self {
                limit: default_limit,
            },
            Some(raw) => Self {
                limit: raw
                    .parse()
                    .map_err(|_| Error::invalid_argument("limit must be a positive integer"))?,
            },
        };

        params
            .validate()
            .map_err(|_| Error::invalid_argument("limit must be a positive integer"))?;

        Ok(params)
    }

    /// Limit clamped to `max` (never above `MAX_LIST_LIMIT` when `max` is 0).
    pub fn effective_limit(&self, max: i64) -> i64 {
        let max = if max > 0 { max } else { MAX_LIST_LIMIT };
        self.limit.min(max)
    }
}

/// Read `product_id` from a track request body.
///
/// Accepts a JSON integer or a string of digits. A missing, null, empty, or
/// zero id is reported as missing.
pub fn product_id_from_body(body: &serde_json::Value) -> Result<i64> {
    let required = || Error::invalid_argument("product_id is required");
    let invalid = || Error::invalid_argument("product_id must be an integer");

    let id = match body.get("product_id") {
        None | Some(serde_json::Value::Null) => return Err(required()),
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(invalid)?,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Err(required()),
        Some(serde_json::Value::String(s)) => s.trim().parse().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };

    if id == 0 {
        return Err(required());
    }

    Ok(id)
}

/// Read the optional `product_id` query parameter of a clear request.
pub fn product_id_from_query(raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_argument("product_id must be an integer")),
    }
}

/// Message returned after a clear.
pub fn cleared_message(count: u64) -> String {
    format!("Cleared {} item(s) from browsing history", count)
}
