//! Generic catalog engine
//!
//! One `CatalogService<K>` exists per resource kind. Every mutation runs the
//! same fixed sequence: store write, cache invalidation, audit append. There
//! is no rollback: if the audit append fails, the store write stays
//! committed and the caller gets an infrastructure error.
//!
//! Collection reads go through the cache and may be up to one TTL stale.
//! Single-record reads always hit the store.

use std::{sync::Arc, time::Duration};

use serde_json::{json, Value};
use uuid::Uuid;

use super::{audit::AuditLog, cache::CacheLayer};
use crate::{
    error::{AppError, AppResult},
    models::{Actor, AuditAction, AuditEntry, CatalogKind, CatalogRecord, Removed},
    repository::RecordStore,
};

pub struct CatalogService<K: CatalogKind> {
    store: Arc<dyn RecordStore<K>>,
    cache: Arc<dyn CacheLayer>,
    audit: Arc<dyn AuditLog>,
    cache_ttl: Duration,
}

impl<K: CatalogKind> Clone for CatalogService<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            audit: self.audit.clone(),
            cache_ttl: self.cache_ttl,
        }
    }
}

impl<K: CatalogKind> CatalogService<K> {
    pub fn new(
        store: Arc<dyn RecordStore<K>>,
        cache: Arc<dyn CacheLayer>,
        audit: Arc<dyn AuditLog>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            audit,
            cache_ttl,
        }
    }

    /// Create a record. A uniqueness conflict leaves the cache and the audit
    /// log untouched.
    pub async fn create(&self, actor: &Actor, input: &K::Create) -> AppResult<K::Record> {
        let record = self.store.create(input).await?;
        self.invalidate().await;
        self.append_audit(AuditAction::Create, actor, K::created_details(&record))
            .await?;

        tracing::info!("{} {} created by {}", K::LABEL, record.id(), actor);
        Ok(record)
    }

    /// All active records, served from the cache when possible
    pub async fn list(&self) -> AppResult<Vec<K::Record>> {
        if let Some(records) = self.cached_collection().await {
            tracing::debug!("Cache hit for {}", K::CACHE_KEY);
            return Ok(records);
        }

        tracing::debug!("Cache miss for {}", K::CACHE_KEY);
        let records = self.store.find_all_active().await?;
        self.populate(&records).await;
        Ok(records)
    }

    /// Get an active record by ID, bypassing the cache
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<K::Record> {
        self.store.find_active_by_id(id).await
    }

    /// Merge `changes` into an active record
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &K::Update,
    ) -> AppResult<K::Record> {
        let changes_summary = serde_json::to_value(changes).map_err(|e| {
            AppError::Internal(format!("Failed to encode {} changes: {}", K::LABEL, e))
        })?;

        let previous = self.get_by_id(id).await?;
        let record = self.store.merge_update(id, changes).await?;
        self.invalidate().await;

        let details = json!({
            "id": id,
            "changes": changes_summary,
            "previous": K::previous_details(&previous),
        });
        self.append_audit(AuditAction::Update, actor, details).await?;

        tracing::info!("{} {} updated by {}", K::LABEL, id, actor);
        Ok(record)
    }

    /// Soft-delete an active record. Removing it again is `NotFound`.
    pub async fn remove(&self, actor: &Actor, id: Uuid) -> AppResult<Removed> {
        let record = self.get_by_id(id).await?;
        self.store.soft_delete(id).await?;
        self.invalidate().await;
        self.append_audit(AuditAction::Delete, actor, K::deleted_details(&record))
            .await?;

        tracing::info!("{} {} removed by {}", K::LABEL, id, actor);
        Ok(Removed {
            id,
            message: format!("{} removed", K::LABEL),
        })
    }

    async fn cached_collection(&self) -> Option<Vec<K::Record>> {
        match self.cache.get(K::CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => Some(records),
                Err(e) => {
                    tracing::warn!("Discarding undecodable cache entry {}: {}", K::CACHE_KEY, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", K::CACHE_KEY, e);
                None
            }
        }
    }

    async fn populate(&self, records: &[K::Record]) {
        let raw = match serde_json::to_string(records) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to encode {} for caching: {}", K::CACHE_KEY, e);
                return;
            }
        };
        if let Err(e) = self.cache.set(K::CACHE_KEY, raw, self.cache_ttl).await {
            tracing::warn!("Cache write failed for {}: {}", K::CACHE_KEY, e);
        }
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.delete(K::CACHE_KEY).await {
            tracing::warn!("Cache invalidation failed for {}: {}", K::CACHE_KEY, e);
        }
    }

    async fn append_audit(
        &self,
        action: AuditAction,
        actor: &Actor,
        details: Value,
    ) -> AppResult<()> {
        let entry = AuditEntry::new(K::audit_action(action), actor, details);
        self.audit.append(&entry).await.map_err(|e| {
            tracing::error!(
                "{} committed but not audited ({}): {}",
                entry.action,
                actor,
                e
            );
            AppError::from(e)
        })
    }
}
