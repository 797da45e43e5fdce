//! Read-only product catalog summaries.
//!
//! The catalog is owned by the storefront; these are the slices of it the
//! history service returns alongside browsing events.

use serde::{Deserialize, Serialize};

/// Product listing summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// Decimal price as text, e.g. "24999.00"
    pub price: String,
    pub old_price: Option<String>,
    pub main_image: Option<String>,
    pub is_on_sale: bool,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
}

/// Category summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
}

/// Subcategory summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
}
