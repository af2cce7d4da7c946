//! Catalog endpoints, shared by every resource kind
//!
//! `POST /` create, `GET /` list, `GET /:id` fetch, `PATCH /:id` partial
//! update, `DELETE /:id` soft delete.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Actor, CatalogKind, Removed},
    services::catalog::CatalogService,
};

use super::ValidatedJson;

/// Handler state for one resource kind
pub struct CatalogState<K: CatalogKind> {
    pub service: CatalogService<K>,
    /// Actor recorded when a request carries no `X-Actor` header
    pub default_actor: Arc<str>,
}

impl<K: CatalogKind> Clone for CatalogState<K> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            default_actor: self.default_actor.clone(),
        }
    }
}

/// Routes for one resource kind, to be nested under its collection path
pub fn routes<K: CatalogKind>(service: CatalogService<K>, default_actor: Arc<str>) -> Router {
    Router::new()
        .route("/", get(list::<K>).post(create::<K>))
        .route("/:id", get(get_one::<K>).patch(update::<K>).delete(remove::<K>))
        .with_state(CatalogState {
            service,
            default_actor,
        })
}

/// List all active records
pub async fn list<K: CatalogKind>(
    State(state): State<CatalogState<K>>,
) -> AppResult<Json<Vec<K::Record>>> {
    let records = state.service.list().await?;
    Ok(Json(records))
}

/// Get an active record by ID
pub async fn get_one<K: CatalogKind>(
    State(state): State<CatalogState<K>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<K::Record>> {
    let record = state.service.get_by_id(id).await?;
    Ok(Json(record))
}

/// Create a record
pub async fn create<K: CatalogKind>(
    State(state): State<CatalogState<K>>,
    actor: Actor,
    ValidatedJson(data): ValidatedJson<K::Create>,
) -> AppResult<(StatusCode, Json<K::Record>)> {
    let record = state.service.create(&actor, &data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Partially update a record
pub async fn update<K: CatalogKind>(
    State(state): State<CatalogState<K>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidatedJson(data): ValidatedJson<K::Update>,
) -> AppResult<Json<K::Record>> {
    let record = state.service.update(&actor, id, &data).await?;
    Ok(Json(record))
}

/// Soft-delete a record
pub async fn remove<K: CatalogKind>(
    State(state): State<CatalogState<K>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Removed>> {
    let removed = state.service.remove(&actor, id).await?;
    Ok(Json(removed))
}
