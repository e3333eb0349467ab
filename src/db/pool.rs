use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// bb8 pool of diesel-async PostgreSQL connections. Cloning shares the pool.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Builds the pool described by `[database]`, opening `min_connections`
/// connections up front.
pub async fn establish_async_connection_pool(
    config: &DatabaseConfig,
) -> Result<AsyncDbPool, AppError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.url);

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|source| AppError::ConnectionPool {
            source: source.into(),
        })?;

    tracing::info!(
        size = config.max_connections,
        idle = config.min_connections,
        timeout_secs = config.connection_timeout,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}
