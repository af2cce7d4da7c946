//! API handlers for the catalog REST endpoints

pub mod catalog;
pub mod health;

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{Actor, CatalogKind},
    AppState,
};

use self::catalog::CatalogState;

/// Request header naming the actor responsible for a change
pub const ACTOR_HEADER: &str = "x-actor";

/// The actor comes from the `X-Actor` header, or the configured default
#[async_trait]
impl<K: CatalogKind> FromRequestParts<CatalogState<K>> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CatalogState<K>,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Actor::new(state.default_actor.as_ref()));
        };

        let name = header
            .to_str()
            .map_err(|_| AppError::Validation("Invalid X-Actor header".to_string()))?
            .trim();
        if name.is_empty() {
            return Err(AppError::Validation("X-Actor header is empty".to_string()));
        }
        Ok(Actor::new(name))
    }
}

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(Self(value))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let default_actor: Arc<str> = Arc::from(state.config.audit.default_actor.as_str());
    let services = &state.services;

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog collections
        .nest("/books", catalog::routes(services.books.clone(), default_actor.clone()))
        .nest("/authors", catalog::routes(services.authors.clone(), default_actor.clone()))
        .nest(
            "/categories",
            catalog::routes(services.categories.clone(), default_actor.clone()),
        )
        .nest(
            "/publishers",
            catalog::routes(services.publishers.clone(), default_actor.clone()),
        )
        .nest("/members", catalog::routes(services.members.clone(), default_actor));

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
