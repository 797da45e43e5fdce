//! In-process backends for development and tests.

use async_trait::async_trait;
use history_core::{
    sort_by_recency, BrowsingEvent, CategorySummary, ProductSummary, Result, SubcategorySummary,
    UpsertOutcome, UserId, ViewRecord,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};

use crate::repository::{Catalog, HistoryStore};

#[derive(Default)]
struct HistoryRows {
    next_id: i64,
    rows: HashMap<(UserId, i64), BrowsingEvent>,
}

/// Browsing history kept in a mutex-guarded map.
///
/// Every upsert runs under the lock, which gives the same no-lost-update
/// guarantee as the row lock in PostgreSQL.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<HistoryRows>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows across all users.
    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn upsert_view(&self, view: ViewRecord) -> Result<UpsertOutcome> {
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.rows.get_mut(&(view.user_id, view.product_id)) {
            existing.view_count += 1;
            existing.last_viewed_at = existing.last_viewed_at.max(view.viewed_at);
            existing.category_id = existing.category_id.or(view.category_id);
            existing.subcategory_id = existing.subcategory_id.or(view.subcategory_id);
            return Ok(UpsertOutcome {
                event: existing.clone(),
                created: false,
            });
        }

        inner.next_id += 1;
        let event = BrowsingEvent {
            id: inner.next_id,
            user_id: view.user_id,
            product_id: view.product_id,
            category_id: view.category_id,
            subcategory_id: view.subcategory_id,
            view_count: 1,
            first_viewed_at: view.viewed_at,
            last_viewed_at: view.viewed_at,
        };
        inner
            .rows
            .insert((view.user_id, view.product_id), event.clone());

        Ok(UpsertOutcome {
            event,
            created: true,
        })
    }

    async fn recent(&self, user_id: UserId, limit: i64) -> Result<Vec<BrowsingEvent>> {
        let mut events = self.all_for_user(user_id).await?;
        sort_by_recency(&mut events);
        events.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(events)
    }

    async fn all_for_user(&self, user_id: UserId) -> Result<Vec<BrowsingEvent>> {
        Ok(self
            .inner
            .lock()
            .rows
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_one(&self, user_id: UserId, product_id: i64) -> Result<u64> {
        let removed = self.inner.lock().rows.remove(&(user_id, product_id));
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_all(&self, user_id: UserId) -> Result<u64> {
        let mut inner = self.inner.lock();
        let before = inner.rows.len();
        inner.rows.retain(|(owner, _), _| *owner != user_id);
        Ok((before - inner.rows.len()) as u64)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct CatalogData {
    categories: BTreeMap<i64, CategorySummary>,
    subcategories: BTreeMap<i64, SubcategorySummary>,
    products: BTreeMap<i64, (ProductSummary, bool)>,
}

/// Catalog kept in memory. Products carry an active flag.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogData>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_category(&self, category: CategorySummary) {
        self.inner.write().categories.insert(category.id, category);
    }

    pub fn insert_subcategory(&self, subcategory: SubcategorySummary) {
        self.inner
            .write()
            .subcategories
            .insert(subcategory.id, subcategory);
    }

    pub fn insert_product(&self, product: ProductSummary) {
        self.inner
            .write()
            .products
            .insert(product.id, (product, true));
    }

    /// Hide a product from lookups, as the storefront does for delisted items.
    pub fn deactivate_product(&self, id: i64) {
        if let Some((_, active)) = self.inner.write().products.get_mut(&id) {
            *active = false;
        }
    }

    /// A small furniture catalog for local development.
    pub fn demo() -> Self {
        let catalog = Self::new();

        let categories = [
            (1, "Sofas", "sofas", "Comfortable sofas for every living room"),
            (2, "Recliners", "recliners", "Manual and motorised recliners"),
            (3, "Beds", "beds", "Beds with and without storage"),
        ];
        for (id, name, slug, description) in categories {
            catalog.insert_category(CategorySummary {
                id,
                name: name.to_string(),
                slug: slug.to_string(),
                description: description.to_string(),
                image: None,
            });
        }

        let subcategories = [(1, "3-Seater", "3-seater"), (2, "2-Seater", "2-seater")];
        for (id, name, slug) in subcategories {
            catalog.insert_subcategory(SubcategorySummary {
                id,
                name: name.to_string(),
                slug: slug.to_string(),
                description: String::new(),
            });
        }

        let products = [
            (1, "Aurora 3-Seater Fabric Sofa", "aurora-3-seater", "32999.00", 1, Some(1)),
            (2, "Aurora 2-Seater Fabric Sofa", "aurora-2-seater", "24999.00", 1, Some(2)),
            (3, "Nova Single Recliner", "nova-single-recliner", "18999.00", 2, None),
            (4, "Orion Queen Storage Bed", "orion-queen-bed", "41999.00", 3, None),
            (5, "Luna King Bed", "luna-king-bed", "45999.00", 3, None),
        ];
        for (id, title, slug, price, category_id, subcategory_id) in products {
            catalog.insert_product(ProductSummary {
                id,
                title: title.to_string(),
                slug: slug.to_string(),
                price: price.to_string(),
                old_price: None,
                main_image: None,
                is_on_sale: false,
                category_id,
                subcategory_id,
            });
        }

        catalog
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn product(&self, id: i64) -> Result<Option<ProductSummary>> {
        Ok(self
            .inner
            .read()
            .products
            .get(&id)
            .filter(|(_, active)| *active)
            .map(|(product, _)| product.clone()))
    }

    async fn products(&self, ids: &[i64]) -> Result<HashMap<i64, ProductSummary>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.products.get(id))
            .map(|(product, _)| (product.id, product.clone()))
            .collect())
    }

    async fn categories(&self, ids: &[i64]) -> Result<HashMap<i64, CategorySummary>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.categories.get(id))
            .map(|c| (c.id, c.clone()))
            .collect())
    }

    async fn subcategories(&self, ids: &[i64]) -> Result<HashMap<i64, SubcategorySummary>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.subcategories.get(id))
            .map(|s| (s.id, s.clone()))
            .collect())
    }

    async fn active_product_counts(&self, category_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        let inner = self.inner.read();
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for (product, active) in inner.products.values() {
            if *active && category_ids.contains(&product.category_id) {
                *counts.entry(product.category_id).or_default() += 1;
            }
        }
        Ok(counts)
    }
}
