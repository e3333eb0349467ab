//! Process-local repository backend.
//!
//! Entities live in a map for the lifetime of the process. Listing follows
//! insertion order; overwriting an id keeps its original position.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;

use super::Repository;
use crate::error::{AppError, AppResult};
use crate::models::{Entity, UNASSIGNED_ID};

struct MemoryTable<T> {
    items: HashMap<i32, T>,
    order: Vec<i32>,
    next_id: i32,
}

impl<T: Entity> MemoryTable<T> {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Smallest free id at or above `next_id`.
    fn free_id(&self) -> Option<i32> {
        let mut candidate = self.next_id;
        while self.items.contains_key(&candidate) {
            candidate = candidate.checked_add(1)?;
        }
        Some(candidate)
    }

    fn upsert(&mut self, mut item: T) -> AppResult<T> {
        if item.id() == UNASSIGNED_ID {
            let id = self.free_id().ok_or_else(|| AppError::Validation {
                field: "id".to_string(),
                reason: format!("no {} ids left to assign; supply one explicitly", T::NAME),
            })?;
            item.set_id(id);
        }
        let id = item.id();
        self.next_id = self.next_id.max(id.saturating_add(1));

        if self.items.insert(id, item.clone()).is_none() {
            self.order.push(id);
        }
        Ok(item)
    }

    fn remove(&mut self, id: i32) -> bool {
        if self.items.remove(&id).is_some() {
            self.order.retain(|existing| *existing != id);
            true
        } else {
            false
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect()
    }
}

/// In-memory repository for one entity type.
///
/// Clones share the same table.
pub struct InMemoryRepository<T> {
    table: Arc<RwLock<MemoryTable<T>>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(MemoryTable::new())),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.table.read().await.items.len()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, mut item: T) -> AppResult<T> {
        item.normalize();
        let stored = self.table.write().await.upsert(item)?;
        tracing::debug!(entity = T::NAME, id = stored.id(), "Stored entity in memory");
        Ok(stored)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let removed = self.table.write().await.remove(id);
        tracing::debug!(entity = T::NAME, id, removed, "Deleted entity from memory");
        Ok(())
    }

    async fn get(&self, id: i32) -> AppResult<Option<T>> {
        Ok(self.table.read().await.items.get(&id).cloned())
    }

    fn get_all(&self) -> BoxStream<'static, AppResult<T>> {
        let table = Arc::clone(&self.table);
        stream::once(async move { table.read().await.snapshot() })
            .flat_map(|items| stream::iter(items.into_iter().map(Ok)))
            .boxed()
    }
}
