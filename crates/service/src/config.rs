//! Listing limits.

use history_core::limits::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use serde::{Deserialize, Serialize};

/// Listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Page size when the request has no `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// Larger requested limits are clamped to this.
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

fn default_max_limit() -> i64 {
    MAX_LIST_LIMIT
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}
