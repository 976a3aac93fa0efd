/*
 * Responsibility
 * - PostgreSQL 接続プールの生成 (起動時に一度だけ)
 * - 生成したプールは AppState 経由で handler/repo に渡す
 */
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(config.connect_options())
        .await?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "connected to PostgreSQL"
    );

    Ok(pool)
}
