//! PostgreSQL repository backend using diesel_async.
//!
//! Table access lives in [`StoredEntity`] impls; [`DbRepository`] adds the
//! pool checkout, transactions and streaming on top.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::QueryResult;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tokio::sync::{Mutex, MutexGuard};

use super::Repository;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::Entity;

/// Table-level operations for an entity persisted in PostgreSQL.
///
/// Every method runs on a caller-supplied connection so the repository can
/// compose them inside one transaction.
#[async_trait]
pub trait StoredEntity: Entity {
    /// Inserts the row and its relation rows, returning the stored entity.
    async fn insert(conn: &mut AsyncPgConnection, item: &Self) -> QueryResult<Self>;

    async fn find(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Self>>;

    /// Deletes the row; relation rows go with it through `ON DELETE CASCADE`.
    async fn remove(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize>;

    /// Up to `limit` entities with `id > after`, ascending by id.
    async fn page_after(
        conn: &mut AsyncPgConnection,
        after: i32,
        limit: i64,
    ) -> QueryResult<Vec<Self>>;
}

/// Groups `(owner, related)` pairs by owner, each group sorted ascending.
pub(crate) fn group_links(pairs: Vec<(i32, i32)>) -> HashMap<i32, Vec<i32>> {
    let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
    for (owner, related) in pairs {
        grouped.entry(owner).or_default().push(related);
    }
    for related in grouped.values_mut() {
        related.sort_unstable();
        related.dedup();
    }
    grouped
}

/// Moves the serial sequence of `table` past the largest stored id.
///
/// Needed after inserting a caller-supplied id, otherwise the next generated
/// id could collide with it.
pub(crate) async fn realign_sequence(
    conn: &mut AsyncPgConnection,
    table: &'static str,
) -> QueryResult<()> {
    diesel::sql_query(format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), GREATEST((SELECT MAX(id) FROM {table}), 1))"
    ))
    .execute(conn)
    .await?;
    Ok(())
}

/// Repository over one PostgreSQL table set.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
pub struct DbRepository<T> {
    pool: AsyncDbPool,
    batch_size: i64,
    write_lock: Option<Arc<Mutex<()>>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for DbRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            batch_size: self.batch_size,
            write_lock: self.write_lock.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: StoredEntity> DbRepository<T> {
    /// Creates a repository.
    ///
    /// # Arguments
    /// * `pool` - Shared connection pool
    /// * `batch_size` - Rows fetched per round trip by `get_all`
    /// * `serialize_writes` - Run `add`/`delete` one at a time
    pub fn new(pool: AsyncDbPool, batch_size: i64, serialize_writes: bool) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
            write_lock: serialize_writes.then(|| Arc::new(Mutex::new(()))),
            _entity: PhantomData,
        }
    }

    async fn lock_writes(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    fn convert(error: DieselError, action: &str) -> AppError {
        DatabaseErrorConverter::convert_diesel_error(error, &format!("{} {}", action, T::NAME))
    }

    async fn fetch_page(pool: &AsyncDbPool, after: i32, limit: i64) -> AppResult<Vec<T>> {
        let mut conn = pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut conn;
        T::page_after(conn, after, limit)
            .await
            .map_err(|e| Self::convert(e, "list"))
    }
}

#[async_trait]
impl<T: StoredEntity> Repository<T> for DbRepository<T> {
    async fn add(&self, mut item: T) -> AppResult<T> {
        item.normalize();
        let _guard = self.lock_writes().await;

        let mut conn = self.pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut conn;
        let stored = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move { T::insert(conn, &item).await }.scope_boxed()
            })
            .await
            .map_err(|e| Self::convert(e, "insert"))?;

        tracing::debug!(entity = T::NAME, id = stored.id(), "Stored entity");
        Ok(stored)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let _guard = self.lock_writes().await;

        let mut conn = self.pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut conn;
        let removed = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    match T::find(conn, id).await? {
                        Some(_) => T::remove(conn, id).await,
                        None => Ok(0),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(|e| Self::convert(e, "delete"))?;

        tracing::debug!(entity = T::NAME, id, removed, "Deleted entity");
        Ok(())
    }

    async fn get(&self, id: i32) -> AppResult<Option<T>> {
        let mut conn = self.pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut conn;
        T::find(conn, id)
            .await
            .map_err(|e| Self::convert(e, "find"))
    }

    fn get_all(&self) -> BoxStream<'static, AppResult<T>> {
        let pool = self.pool.clone();
        let limit = self.batch_size;

        stream::try_unfold(Some(i32::MIN), move |cursor| {
            let pool = pool.clone();
            async move {
                let Some(after) = cursor else {
                    return Ok::<_, AppError>(None);
                };
                let page = Self::fetch_page(&pool, after, limit).await?;
                if page.is_empty() {
                    return Ok(None);
                }
                let next = if page.len() as i64 == limit {
                    page.last().map(|item| item.id())
                } else {
                    None
                };
                tracing::trace!(entity = T::NAME, rows = page.len(), "Fetched page");
                Ok(Some((stream::iter(page.into_iter().map(Ok)), next)))
            }
        })
        .try_flatten()
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_links_groups_and_sorts() {
        let grouped = group_links(vec![(1, 30), (2, 5), (1, 10), (1, 20), (1, 10)]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1], vec![10, 20, 30]);
        assert_eq!(grouped[&2], vec![5]);
    }

    #[test]
    fn test_group_links_empty() {
        assert!(group_links(Vec::new()).is_empty());
    }
}
