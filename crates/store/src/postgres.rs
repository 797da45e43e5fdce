//! PostgreSQL backends.
//!
//! Integer columns are cast to `bigint` on read so the queries also work
//! against storefront databases created with 32-bit serial ids.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use history_core::{
    BrowsingEvent, CategorySummary, DbErrorCode, Error, ProductSummary, Result,
    SubcategorySummary, UpsertOutcome, UserId, ViewRecord,
};
use sqlx::FromRow;
use std::collections::HashMap;
use telemetry::metrics;
use tracing::{debug, warn};

use crate::client::PgClient;
use crate::health::check_connection;
use crate::repository::{Catalog, HistoryStore};

const EVENT_COLUMNS: &str = "id::bigint AS id, user_id::bigint AS user_id, \
     product_id::bigint AS product_id, category_id::bigint AS category_id, \
     subcategory_id::bigint AS subcategory_id, view_count::bigint AS view_count, \
     viewed_at AS first_viewed_at, last_viewed AS last_viewed_at";

/// Atomic upsert. The conflicting row is locked for the update, so
/// concurrent views of the same pair serialize and none are lost.
/// `xmax = 0` only holds for freshly inserted tuples.
const UPSERT_VIEW: &str = "INSERT INTO browsing_history \
         (user_id, product_id, category_id, subcategory_id, viewed_at, view_count, last_viewed) \
     VALUES ($1, $2, $3, $4, $5, 1, $5) \
     ON CONFLICT (user_id, product_id) DO UPDATE SET \
         view_count = browsing_history.view_count + 1, \
         last_viewed = GREATEST(browsing_history.last_viewed, EXCLUDED.last_viewed), \
         category_id = COALESCE(browsing_history.category_id, EXCLUDED.category_id), \
         subcategory_id = COALESCE(browsing_history.subcategory_id, EXCLUDED.subcategory_id) \
     RETURNING id::bigint AS id, user_id::bigint AS user_id, \
         product_id::bigint AS product_id, category_id::bigint AS category_id, \
         subcategory_id::bigint AS subcategory_id, view_count::bigint AS view_count, \
         viewed_at AS first_viewed_at, last_viewed AS last_viewed_at, \
         (xmax = 0) AS created";

#[derive(Debug, FromRow)]
struct EventRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
    view_count: i64,
    first_viewed_at: DateTime<Utc>,
    last_viewed_at: DateTime<Utc>,
}

impl From<EventRow> for BrowsingEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId(row.user_id),
            product_id: row.product_id,
            category_id: row.category_id,
            subcategory_id: row.subcategory_id,
            view_count: row.view_count,
            first_viewed_at: row.first_viewed_at,
            last_viewed_at: row.last_viewed_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    event: EventRow,
    created: bool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    title: String,
    slug: String,
    price: String,
    old_price: Option<String>,
    main_image: Option<String>,
    is_on_sale: bool,
    category_id: i64,
    subcategory_id: Option<i64>,
}

impl From<ProductRow> for ProductSummary {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            price: row.price,
            old_price: row.old_price,
            main_image: row.main_image,
            is_on_sale: row.is_on_sale,
            category_id: row.category_id,
            subcategory_id: row.subcategory_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
    image: Option<String>,
}

#[derive(Debug, FromRow)]
struct SubcategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
}

fn query_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| {
        metrics().store_errors.inc();
        warn!(error = %e, "{}", context);
        Error::database(DbErrorCode::QueryFailed, format!("{}: {}", context, e))
    }
}

/// Browsing history rows in PostgreSQL.
#[derive(Clone)]
pub struct PgHistoryStore {
    client: PgClient,
}

impl PgHistoryStore {
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn upsert_view(&self, view: ViewRecord) -> Result<UpsertOutcome> {
        let _timer = metrics().store_latency.start();

        let row: UpsertRow = sqlx::query_as(UPSERT_VIEW)
            .bind(view.user_id.get())
            .bind(view.product_id)
            .bind(view.category_id)
            .bind(view.subcategory_id)
            .bind(view.viewed_at)
            .fetch_one(self.client.pool())
            .await
            .map_err(|e| {
                // The product was deleted between the catalog lookup and the write.
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return Error::product_not_found();
                    }
                }
                query_error("Failed to upsert browsing history")(e)
            })?;

        Ok(UpsertOutcome {
            event: row.event.into(),
            created: row.created,
        })
    }

    async fn recent(&self, user_id: UserId, limit: i64) -> Result<Vec<BrowsingEvent>> {
        let sql = format!(
            "SELECT {} FROM browsing_history WHERE user_id = $1 \
             ORDER BY last_viewed DESC, id DESC LIMIT $2",
            EVENT_COLUMNS
        );

        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .bind(limit)
            .fetch_all(self.client.pool())
            .await
            .map_err(query_error("Failed to list browsing history"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_for_user(&self, user_id: UserId) -> Result<Vec<BrowsingEvent>> {
        let sql = format!(
            "SELECT {} FROM browsing_history WHERE user_id = $1",
            EVENT_COLUMNS
        );

        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(user_id.get())
            .fetch_all(self.client.pool())
            .await
            .map_err(query_error("Failed to load browsing history"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_one(&self, user_id: UserId, product_id: i64) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM browsing_history WHERE user_id = $1 AND product_id = $2")
                .bind(user_id.get())
                .bind(product_id)
                .execute(self.client.pool())
                .await
                .map_err(query_error("Failed to clear browsing history item"))?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM browsing_history WHERE user_id = $1")
            .bind(user_id.get())
            .execute(self.client.pool())
            .await
            .map_err(query_error("Failed to clear browsing history"))?;

        Ok(result.rows_affected())
    }

    async fn is_healthy(&self) -> bool {
        check_connection(&self.client).await
    }
}

/// Storefront catalog tables in PostgreSQL.
#[derive(Clone)]
pub struct PgCatalog {
    client: PgClient,
}

impl PgCatalog {
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }

    async fn fetch_products(&self, ids: &[i64], active_only: bool) -> Result<Vec<ProductRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as(
            "SELECT id::bigint AS id, title, slug, price::text AS price, \
                 old_price::text AS old_price, main_image, is_on_sale, \
                 category_id::bigint AS category_id, subcategory_id::bigint AS subcategory_id \
             FROM products_product \
             WHERE id = ANY($1::bigint[]) AND (is_active OR NOT $2)",
        )
        .bind(ids)
        .bind(active_only)
        .fetch_all(self.client.pool())
        .await
        .map_err(query_error("Failed to load products"))
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn product(&self, id: i64) -> Result<Option<ProductSummary>> {
        let mut rows = self.fetch_products(&[id], true).await?;
        debug!(product_id = id, found = !rows.is_empty(), "Catalog product lookup");
        Ok(rows.pop().map(Into::into))
    }

    async fn products(&self, ids: &[i64]) -> Result<HashMap<i64, ProductSummary>> {
        Ok(self
            .fetch_products(ids, false)
            .await?
            .into_iter()
            .map(|row| (row.id, row.into()))
            .collect())
    }

    async fn categories(&self, ids: &[i64]) -> Result<HashMap<i64, CategorySummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id::bigint AS id, name, slug, description, image \
             FROM products_category WHERE id = ANY($1::bigint[])",
        )
        .bind(ids)
        .fetch_all(self.client.pool())
        .await
        .map_err(query_error("Failed to load categories"))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    CategorySummary {
                        id: row.id,
                        name: row.name,
                        slug: row.slug,
                        description: row.description,
                        image: row.image,
                    },
                )
            })
            .collect())
    }

    async fn subcategories(&self, ids: &[i64]) -> Result<HashMap<i64, SubcategorySummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<SubcategoryRow> = sqlx::query_as(
            "SELECT id::bigint AS id, name, slug, description \
             FROM products_subcategory WHERE id = ANY($1::bigint[])",
        )
        .bind(ids)
        .fetch_all(self.client.pool())
        .await
        .map_err(query_error("Failed to load subcategories"))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    SubcategorySummary {
                        id: row.id,
                        name: row.name,
                        slug: row.slug,
                        description: row.description,
                    },
                )
            })
            .collect())
    }

    async fn active_product_counts(&self, category_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if category_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT category_id::bigint, COUNT(*)::bigint \
             FROM products_product \
             WHERE category_id = ANY($1::bigint[]) AND is_active \
             GROUP BY category_id",
        )
        .bind(category_ids)
        .fetch_all(self.client.pool())
        .await
        .map_err(query_error("Failed to count category products"))?;

        Ok(rows.into_iter().collect())
    }
}
