//! The browsing history service.
//!
//! Every operation is scoped to the resolved `UserId`; callers never pass a
//! user id taken from the request.

use chrono::Utc;
use history_core::{
    tally_categories, BrowsingEvent, CategoryActivity, CategorySummary, Error, HistoryEntry,
    ListParams, Result, SubcategorySummary, TrackedView, UserId, ViewRecord,
};
use history_store::{Backends, Catalog, HistoryStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;

/// Track, list, aggregate, and clear a user's browsing history.
#[derive(Clone)]
pub struct BrowsingHistoryService {
    history: Arc<dyn HistoryStore>,
    catalog: Arc<dyn Catalog>,
    config: HistoryConfig,
}

impl BrowsingHistoryService {
    pub fn new(backends: &Backends, config: HistoryConfig) -> Self {
        Self::from_parts(backends.history.clone(), backends.catalog.clone(), config)
    }

    pub fn from_parts(
        history: Arc<dyn HistoryStore>,
        catalog: Arc<dyn Catalog>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            history,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Record a view of `product_id`.
    ///
    /// The first view creates the row; later views bump `view_count` and
    /// `last_viewed_at`. Unknown or delisted products fail with NOT_FOUND_001
    /// and nothing is written.
    pub async fn track(&self, user_id: UserId, product_id: i64) -> Result<TrackedView> {
        metrics().track_requests.inc();

        let Some(product) = self.catalog.product(product_id).await? else {
            metrics().products_not_found.inc();
            debug!(user_id = %user_id, product_id, "Tracked product not found");
            return Err(Error::product_not_found());
        };

        let view = ViewRecord::for_product(user_id, &product, Utc::now());
        let outcome = self.history.upsert_view(view).await?;

        if outcome.created {
            metrics().views_created.inc();
        } else {
            metrics().views_incremented.inc();
        }

        let (category, subcategory) = self.summaries_for(&outcome.event).await?;

        info!(
            user_id = %user_id,
            product_id,
            view_count = outcome.event.view_count,
            created = outcome.created,
            "Product view tracked"
        );

        Ok(TrackedView {
            entry: HistoryEntry::new(&outcome.event, product, category, subcategory),
            created: outcome.created,
        })
    }

    /// Parse the raw `limit` query value against the configured default.
    pub fn list_params(&self, limit: Option<&str>) -> Result<ListParams> {
        ListParams::from_query(limit, self.config.default_limit)
    }

    /// The user's most recently viewed products.
    pub async fn list(&self, user_id: UserId, params: &ListParams) -> Result<Vec<HistoryEntry>> {
        metrics().list_requests.inc();

        let limit = params.effective_limit(self.config.max_limit);
        let events = self.history.recent(user_id, limit).await?;
        let entries = self.enrich(&events).await?;

        debug!(user_id = %user_id, limit, count = entries.len(), "Listed browsing history");
        Ok(entries)
    }

    /// Per-category roll-up of everything the user has viewed.
    pub async fn aggregate_categories(&self, user_id: UserId) -> Result<Vec<CategoryActivity>> {
        metrics().category_requests.inc();

        let events = self.history.all_for_user(user_id).await?;
        let tallies = tally_categories(&events);
        if tallies.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = tallies.iter().map(|t| t.category_id).collect();
        let categories = self.catalog.categories(&ids).await?;
        let product_counts = self.catalog.active_product_counts(&ids).await?;

        let activity: Vec<CategoryActivity> = tallies
            .into_iter()
            .filter_map(|tally| {
                let Some(category) = categories.get(&tally.category_id) else {
                    warn!(category_id = tally.category_id, "Browsed category missing from catalog");
                    return None;
                };
                Some(CategoryActivity {
                    id: category.id,
                    name: category.name.clone(),
                    slug: category.slug.clone(),
                    description: category.description.clone(),
                    image: category.image.clone(),
                    product_count: product_counts.get(&category.id).copied().unwrap_or(0),
                    browsed_product_count: tally.browsed_product_count,
                    view_count: tally.view_count,
                    last_viewed_at: tally.last_viewed_at,
                })
            })
            .collect();

        debug!(user_id = %user_id, categories = activity.len(), "Aggregated browsing categories");
        Ok(activity)
    }

    /// Delete one product's row, or the whole history when `product_id` is `None`.
    ///
    /// Returns how many rows were removed.
    pub async fn clear(&self, user_id: UserId, product_id: Option<i64>) -> Result<u64> {
        metrics().clear_requests.inc();

        let cleared = match product_id {
            Some(product_id) => self.history.delete_one(user_id, product_id).await?,
            None => self.history.delete_all(user_id).await?,
        };

        metrics().items_cleared.inc_by(cleared);
        info!(user_id = %user_id, product_id = ?product_id, cleared, "Browsing history cleared");

        Ok(cleared)
    }

    /// Check if the history store is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.history.is_healthy().await
    }

    async fn summaries_for(
        &self,
        event: &BrowsingEvent,
    ) -> Result<(Option<CategorySummary>, Option<SubcategorySummary>)> {
        let category = match event.category_id {
            Some(id) => self.catalog.categories(&[id]).await?.remove(&id),
            None => None,
        };
        let subcategory = match event.subcategory_id {
            Some(id) => self.catalog.subcategories(&[id]).await?.remove(&id),
            None => None,
        };
        Ok((category, subcategory))
    }

    /// Join events with catalog summaries in three batch lookups.
    ///
    /// Events whose product is gone from the catalog are dropped.
    async fn enrich(&self, events: &[BrowsingEvent]) -> Result<Vec<HistoryEntry>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<i64> = unique(events.iter().map(|e| e.product_id));
        let category_ids: Vec<i64> = unique(events.iter().filter_map(|e| e.category_id));
        let subcategory_ids: Vec<i64> = unique(events.iter().filter_map(|e| e.subcategory_id));

        let products = self.catalog.products(&product_ids).await?;
        let categories = self.catalog.categories(&category_ids).await?;
        let subcategories = self.catalog.subcategories(&subcategory_ids).await?;

        let mut entries = Vec::with_capacity(events.len());
        for event in events {
            let Some(product) = products.get(&event.product_id) else {
                warn!(
                    event_id = event.id,
                    product_id = event.product_id,
                    "History row references a missing product"
                );
                continue;
            };

            entries.push(HistoryEntry::new(
                event,
                product.clone(),
                event.category_id.and_then(|id| categories.get(&id).cloned()),
                event.subcategory_id.and_then(|id| subcategories.get(&id).cloned()),
            ));
        }

        Ok(entries)
    }
}

fn unique(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}
