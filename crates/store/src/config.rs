//! Store configuration.

use serde::{Deserialize, Serialize};

/// Connection string that selects the in-memory backend.
pub const MEMORY_URL: &str = "memory";

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL URL, or `memory` for the in-process backend
    #[serde(default = "default_url")]
    pub url: String,
    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Pool acquire timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Create tables on startup if they are missing
    #[serde(default = "default_init_schema")]
    pub init_schema: bool,
}

fn default_url() -> String {
    "postgres://localhost:5432/storefront".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_init_schema() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            timeout_secs: default_timeout_secs(),
            init_schema: default_init_schema(),
        }
    }
}

impl StoreConfig {
    pub fn is_memory(&self) -> bool {
        self.url.trim().eq_ignore_ascii_case(MEMORY_URL)
    }
}
