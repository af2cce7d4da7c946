//! Business logic services

pub mod audit;
pub mod cache;
pub mod catalog;
pub mod redis;

use std::{sync::Arc, time::Duration};

use crate::{
    models::{Authors, Books, Categories, Members, Publishers},
    repository::Repository,
};

use self::{
    audit::{AuditLog, MemoryAuditLog},
    cache::{CacheLayer, MemoryCache},
    catalog::CatalogService,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: CatalogService<Books>,
    pub authors: CatalogService<Authors>,
    pub categories: CatalogService<Categories>,
    pub publishers: CatalogService<Publishers>,
    pub members: CatalogService<Members>,
}

impl Services {
    /// Create all services over the given stores, sharing one cache and one
    /// audit log
    pub fn new(
        repository: Repository,
        cache: Arc<dyn CacheLayer>,
        audit: Arc<dyn AuditLog>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            books: CatalogService::new(repository.books, cache.clone(), audit.clone(), cache_ttl),
            authors: CatalogService::new(
                repository.authors,
                cache.clone(),
                audit.clone(),
                cache_ttl,
            ),
            categories: CatalogService::new(
                repository.categories,
                cache.clone(),
                audit.clone(),
                cache_ttl,
            ),
            publishers: CatalogService::new(
                repository.publishers,
                cache.clone(),
                audit.clone(),
                cache_ttl,
            ),
            members: CatalogService::new(repository.members, cache, audit, cache_ttl),
        }
    }

    /// Services with memory-only record stores, cache and audit log
    pub fn in_memory(cache_ttl: Duration) -> Self {
        Self::new(
            Repository::in_memory(),
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryAuditLog::new()),
            cache_ttl,
        )
    }
}
