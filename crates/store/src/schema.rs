//! PostgreSQL table schemas.
//!
//! Table and column names match the storefront's existing tables, so the
//! service can run against the same database:
//! - `browsing_history` stores `viewed_at` (first view) and `last_viewed`
//! - catalog tables are owned by the storefront; the DDL here only
//!   bootstraps empty databases for development and tests

/// Catalog categories.
pub const CREATE_CATEGORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products_category (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    slug VARCHAR(100) NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    image VARCHAR(500),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    sort_order INTEGER NOT NULL DEFAULT 0
)
"#;

/// Catalog subcategories.
pub const CREATE_SUBCATEGORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products_subcategory (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    slug VARCHAR(100) NOT NULL DEFAULT '',
    category_id BIGINT NOT NULL REFERENCES products_category (id) ON DELETE CASCADE,
    description TEXT NOT NULL DEFAULT '',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    UNIQUE (name, category_id)
)
"#;

/// Catalog products (listing columns only).
pub const CREATE_PRODUCT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products_product (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(200) NOT NULL,
    slug VARCHAR(200) NOT NULL UNIQUE,
    category_id BIGINT NOT NULL REFERENCES products_category (id) ON DELETE CASCADE,
    subcategory_id BIGINT REFERENCES products_subcategory (id) ON DELETE CASCADE,
    price NUMERIC(10, 2) NOT NULL,
    old_price NUMERIC(10, 2),
    is_on_sale BOOLEAN NOT NULL DEFAULT FALSE,
    main_image VARCHAR(500),
    is_active BOOLEAN NOT NULL DEFAULT TRUE
)
"#;

/// One row per (user, product); repeated views update the row.
pub const CREATE_BROWSING_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS browsing_history (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    product_id BIGINT NOT NULL REFERENCES products_product (id) ON DELETE CASCADE,
    category_id BIGINT REFERENCES products_category (id) ON DELETE CASCADE,
    subcategory_id BIGINT REFERENCES products_subcategory (id) ON DELETE CASCADE,
    viewed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    view_count INTEGER NOT NULL DEFAULT 1 CHECK (view_count >= 1),
    last_viewed TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, product_id)
)
"#;

/// Listing index: a user's history, most recent first.
pub const CREATE_HISTORY_RECENT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS browsing_hi_user_id_941c7b_idx
    ON browsing_history (user_id, last_viewed DESC)
"#;

/// Roll-up index: a user's history by category.
pub const CREATE_HISTORY_CATEGORY_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS browsing_hi_user_id_3df6af_idx
    ON browsing_history (user_id, category_id)
"#;

/// Get all DDL statements in dependency order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_CATEGORY_TABLE,
        CREATE_SUBCATEGORY_TABLE,
        CREATE_PRODUCT_TABLE,
        CREATE_BROWSING_HISTORY_TABLE,
        CREATE_HISTORY_RECENT_INDEX,
        CREATE_HISTORY_CATEGORY_INDEX,
    ]
}
