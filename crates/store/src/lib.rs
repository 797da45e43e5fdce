//! Browsing history and catalog storage.

pub mod client;
pub mod config;
pub mod health;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod schema;

pub use client::*;
pub use config::*;
pub use memory::{MemoryCatalog, MemoryHistoryStore};
pub use postgres::{PgCatalog, PgHistoryStore};
pub use repository::{Catalog, HistoryStore};

use history_core::Result;
use std::sync::Arc;
use tracing::{error, info};

/// The store and catalog a service instance runs against.
#[derive(Clone)]
pub struct Backends {
    pub history: Arc<dyn HistoryStore>,
    pub catalog: Arc<dyn Catalog>,
    /// Set for PostgreSQL backends.
    pub client: Option<PgClient>,
}

impl Backends {
    /// In-memory backends seeded with the demo catalog.
    pub fn memory() -> Self {
        Self {
            history: Arc::new(MemoryHistoryStore::new()),
            catalog: Arc::new(MemoryCatalog::demo()),
            client: None,
        }
    }

    /// Open backends for `config`, bootstrapping the schema if asked to.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        if config.is_memory() {
            info!("Using in-memory history store");
            return Ok(Self::memory());
        }

        let client = PgClient::new(config)?;

        if config.init_schema {
            if let Err(e) = health::init_schema(&client).await {
                error!("Failed to initialize PostgreSQL schema: {}", e);
                // Continue anyway - the storefront may own the schema
            }
        }

        Ok(Self {
            history: Arc::new(PgHistoryStore::new(client.clone())),
            catalog: Arc::new(PgCatalog::new(client.clone())),
            client: Some(client),
        })
    }
}
