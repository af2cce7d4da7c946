//! Catalog Server
//!
//! REST JSON backend for a library catalog (books, authors, categories,
//! publishers, members). Every mutation is persisted, invalidates the
//! collection cache and is written to an append-only audit log; removals
//! are soft deletes.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
