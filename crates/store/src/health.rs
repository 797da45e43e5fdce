//! Store health checks and schema bootstrap.

use crate::client::PgClient;
use tracing::{debug, error};

/// Check PostgreSQL connection health.
pub async fn check_connection(client: &PgClient) -> bool {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(client.pool())
        .await
    {
        Ok(_) => {
            debug!("PostgreSQL connection healthy");
            true
        }
        Err(e) => {
            error!("PostgreSQL health check failed: {}", e);
            false
        }
    }
}

/// Initialize database schema.
pub async fn init_schema(client: &PgClient) -> Result<(), String> {
    use crate::schema::all_tables;

    for ddl in all_tables() {
        sqlx::query(ddl)
            .execute(client.pool())
            .await
            .map_err(|e| format!("Failed to execute DDL: {}", e))?;
    }

    debug!("PostgreSQL schema initialized");
    Ok(())
}
