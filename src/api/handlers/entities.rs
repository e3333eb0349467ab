//! Generic CRUD route mapper.
//!
//! Binds one URL segment to one `Repository<T>`. Both catalog entities are
//! served by the same four handlers, monomorphized per entity type.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    routing::get,
};
use futures::TryStreamExt;

use crate::error::{AppError, AppResult};
use crate::models::Entity;
use crate::repositories::SharedRepository;
use crate::utils::ValidatedJson;

/// Creates the routes for one entity type under `/{segment}`.
///
/// Routes:
/// - GET /{segment} and /{segment}/     - List all entities
/// - POST /{segment} and /{segment}/    - Store an entity
/// - GET /{segment}/{id}                - Get entity by ID, 404 when absent
/// - DELETE /{segment}/{id}             - Delete entity by ID, 200 even when absent
pub fn map_routes<T: Entity>(segment: &str, repository: SharedRepository<T>) -> Router {
    let collection = format!("/{}", segment);
    let collection_slash = format!("/{}/", segment);
    let item = format!("/{}/{{id}}", segment);

    Router::new()
        .route(&collection, get(list_entities::<T>).post(add_entity::<T>))
        .route(&collection_slash, get(list_entities::<T>).post(add_entity::<T>))
        .route(&item, get(get_entity::<T>).delete(delete_entity::<T>))
        .with_state(repository)
}

/// Returns a JSON array of every stored entity.
async fn list_entities<T: Entity>(
    State(repository): State<SharedRepository<T>>,
) -> AppResult<Json<Vec<T>>> {
    let items: Vec<T> = repository.get_all().try_collect().await?;
    Ok(Json(items))
}

async fn get_entity<T: Entity>(
    State(repository): State<SharedRepository<T>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<T>> {
    let Path(id) = id?;
    repository
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found_by_id(T::NAME, id))
}

/// Stores the body and answers 200 with the entity as stored, generated id included.
async fn add_entity<T: Entity>(
    State(repository): State<SharedRepository<T>>,
    ValidatedJson(item): ValidatedJson<T>,
) -> AppResult<Json<T>> {
    let stored = repository.add(item).await?;
    tracing::info!(entity = T::NAME, id = stored.id(), "Entity stored");
    Ok(Json(stored))
}

async fn delete_entity<T: Entity>(
    State(repository): State<SharedRepository<T>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    repository.delete(id).await?;
    Ok(StatusCode::OK)
}
