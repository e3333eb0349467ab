//! Repository layer for data access operations.
//!
//! `Repository<T>` is the backend-agnostic CRUD capability for one entity
//! type. Two implementations exist: [`InMemoryRepository`] and
//! [`DbRepository`]. [`Repositories`] wires one handle per entity from the
//! configured backend.

mod category_store;
mod db;
mod memory;
mod product_store;

pub use db::{DbRepository, StoredEntity};
pub use memory::InMemoryRepository;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::{RepositoryBackend, Settings};
use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{Category, Entity, Product};

/// CRUD capability for one entity type.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Stores `item`, assigning an id when it has none, and returns what was stored.
    async fn add(&self, item: T) -> AppResult<T>;

    /// Removes the entity with `id`; absent ids are not an error.
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Point lookup; `Ok(None)` when no entity has `id`.
    async fn get(&self, id: i32) -> AppResult<Option<T>>;

    /// Lazily yields every stored entity. Each call starts a fresh sequence.
    fn get_all(&self) -> BoxStream<'static, AppResult<T>>;
}

/// Shared handle to a repository.
pub type SharedRepository<T> = Arc<dyn Repository<T>>;

/// One repository handle per entity type.
///
/// Cloning is cheap: both handles are `Arc`s.
#[derive(Clone)]
pub struct Repositories {
    pub products: SharedRepository<Product>,
    pub categories: SharedRepository<Category>,
}

impl Repositories {
    /// Process-local repositories with no persistence.
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(InMemoryRepository::<Product>::new()),
            categories: Arc::new(InMemoryRepository::<Category>::new()),
        }
    }

    /// PostgreSQL-backed repositories sharing one connection pool.
    pub fn database(pool: AsyncDbPool, settings: &Settings) -> Self {
        let batch_size = settings.database.stream_batch_size;
        let serialize_writes = settings.repository.serialize_writes;
        Self {
            products: Arc::new(DbRepository::<Product>::new(
                pool.clone(),
                batch_size,
                serialize_writes,
            )),
            categories: Arc::new(DbRepository::<Category>::new(
                pool,
                batch_size,
                serialize_writes,
            )),
        }
    }

    /// Builds the repositories selected by `repository.backend`.
    ///
    /// `pool` is only consulted for the database backend.
    pub fn from_settings(settings: &Settings, pool: Option<AsyncDbPool>) -> AppResult<Self> {
        match (settings.repository.backend, pool) {
            (RepositoryBackend::Memory, _) => Ok(Self::in_memory()),
            (RepositoryBackend::Database, Some(pool)) => Ok(Self::database(pool, settings)),
            (RepositoryBackend::Database, None) => Err(crate::error::AppError::Configuration {
                key: "repository.backend".to_string(),
                source: anyhow::anyhow!("database backend selected but no connection pool was created"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_memory_ignores_pool() {
        let mut settings = Settings::default();
        settings.repository.backend = RepositoryBackend::Memory;
        assert!(Repositories::from_settings(&settings, None).is_ok());
    }

    #[test]
    fn test_from_settings_database_requires_pool() {
        let mut settings = Settings::default();
        settings.repository.backend = RepositoryBackend::Database;
        let result = Repositories::from_settings(&settings, None);
        assert!(matches!(
            result,
            Err(crate::error::AppError::Configuration { .. })
        ));
    }
}
