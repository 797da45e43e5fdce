//! Category roll-up of a user's browsing events.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::history::BrowsingEvent;

/// Aggregated activity for one category, before catalog enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub category_id: i64,
    pub view_count: i64,
    pub browsed_product_count: i64,
    pub last_viewed_at: DateTime<Utc>,
}

#[derive(Default)]
struct Accumulator {
    view_count: i64,
    products: BTreeSet<i64>,
    last_viewed_at: Option<DateTime<Utc>>,
}

/// Group events by category.
///
/// Events without a category are skipped. Ordered by summed view count
/// descending, then most recent view, then category id ascending.
pub fn tally_categories<'a, I>(events: I) -> Vec<CategoryTally>
where
    I: IntoIterator<Item = &'a BrowsingEvent>,
{
    let mut groups: BTreeMap<i64, Accumulator> = BTreeMap::new();

    for event in events {
        let Some(category_id) = event.category_id else {
            continue;
        };
        let acc = groups.entry(category_id).or_default();
        acc.view_count += event.view_count;
        acc.products.insert(event.product_id);
        acc.last_viewed_at = acc.last_viewed_at.max(Some(event.last_viewed_at));
    }

    let mut tallies: Vec<CategoryTally> = groups
        .into_iter()
        .filter_map(|(category_id, acc)| {
            Some(CategoryTally {
                category_id,
                view_count: acc.view_count,
                browsed_product_count: acc.products.len() as i64,
                last_viewed_at: acc.last_viewed_at?,
            })
        })
        .collect();

    tallies.sort_by(|a, b| {
        b.view_count
            .cmp(&a.view_count)
            .then_with(|| b.last_viewed_at.cmp(&a.last_viewed_at))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    tallies
}
