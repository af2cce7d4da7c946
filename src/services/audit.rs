//! Append-only audit log

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::AuditEntry;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to write audit entry: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Audit log unavailable: {0}")]
    Unavailable(String),
}

/// Write-only sink for state-change records.
///
/// A failed append is reported to the caller; whatever the caller already
/// committed stays committed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Audit log kept in process memory
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry appended so far, oldest first
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }

    /// Entries carrying the given action tag
    pub async fn entries_for(&self, action: &str) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.action == action)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}
