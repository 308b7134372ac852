use crate::config::Config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Pool that only connects on first use. The server can start while the
/// database is down; session calls then fall back to the in-memory store.
pub fn create_lazy_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
        .connect_lazy(&config.database_url)?;
    Ok(pool)
}
