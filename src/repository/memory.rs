//! In-memory record store
//!
//! Mirrors the PostgreSQL store's semantics, constraint names included, so
//! the service can run without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{CatalogKind, CatalogRecord, RecordMeta},
};

pub struct MemoryRecordStore<K: CatalogKind> {
    records: RwLock<HashMap<Uuid, K::Record>>,
}

impl<K: CatalogKind> MemoryRecordStore<K> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored rows, active or not
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("{} {} not found", K::LABEL, id))
    }

    /// Reject `candidate` if any other row holds one of its unique values
    fn check_unique(records: &HashMap<Uuid, K::Record>, candidate: &K::Record) -> AppResult<()> {
        for (constraint, value) in K::unique_values(candidate) {
            let taken = records
                .values()
                .filter(|other| other.id() != candidate.id())
                .flat_map(K::unique_values)
                .any(|(other_constraint, other_value)| {
                    other_constraint == constraint && other_value == value
                });
            if taken {
                return Err(AppError::Conflict(K::conflict_message(Some(constraint))));
            }
        }
        Ok(())
    }
}

impl<K: CatalogKind> Default for MemoryRecordStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CatalogKind> RecordStore<K> for MemoryRecordStore<K> {
    async fn create(&self, input: &K::Create) -> AppResult<K::Record> {
        let record = K::build(RecordMeta::new(Uuid::new_v4()), input);
        let mut records = self.records.write().await;
        Self::check_unique(&records, &record)?;
        records.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn find_active_by_id(&self, id: Uuid) -> AppResult<K::Record> {
        self.records
            .read()
            .await
            .get(&id)
            .filter(|record| record.is_active())
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn find_all_active(&self) -> AppResult<Vec<K::Record>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.is_active())
            .cloned()
            .collect())
    }

    async fn merge_update(&self, id: Uuid, changes: &K::Update) -> AppResult<K::Record> {
        let mut records = self.records.write().await;
        let mut record = records.get(&id).cloned().ok_or_else(|| Self::not_found(id))?;

        K::merge(&mut record, changes);
        record.meta_mut().touch();
        Self::check_unique(&records, &record)?;

        records.insert(id, record.clone());
        Ok(record)
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) if record.is_active() => {
                record.meta_mut().deactivate();
                Ok(())
            }
            _ => Err(Self::not_found(id)),
        }
    }
}
