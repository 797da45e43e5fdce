//! PostgreSQL pool wrapper.

use crate::config::StoreConfig;
use history_core::{DbErrorCode, Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// PostgreSQL client wrapper with connection pooling.
#[derive(Clone)]
pub struct PgClient {
    pool: PgPool,
}

impl PgClient {
    /// Creates a new client. Connections are opened lazily on first use.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.timeout_secs))
            .connect_lazy(&config.url)
            .map_err(|e| {
                Error::database(
                    DbErrorCode::QueryFailed,
                    format!("Invalid database URL: {}", e),
                )
            })?;

        info!(
            max_connections = config.max_connections,
            "Created PostgreSQL pool"
        );

        Ok(Self { pool })
    }

    /// Returns the inner pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
