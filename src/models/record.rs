//! Fields and behaviour shared by every catalog record

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Identity, lifecycle flag and timestamps carried by every record.
///
/// Timestamps are held at microsecond precision so a record compares equal
/// whether it came back from PostgreSQL, the cache, or memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecordMeta {
    pub id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Metadata for a freshly created, active record
    pub fn new(id: Uuid) -> Self {
        let now = now();
        Self {
            id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance `updated_at`; it never stays put, even within one microsecond
    pub fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }

    /// One-way ACTIVE -> INACTIVE transition
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }
}

/// Access to the shared metadata of a concrete record type
pub trait CatalogRecord {
    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn is_active(&self) -> bool {
        self.meta().is_active
    }
}

/// Acknowledgment returned by a successful removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removed {
    pub id: Uuid,
    pub message: String,
}

/// Current time truncated to microseconds
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::microseconds(1)).unwrap_or(now)
}

/// A timestamp strictly later than `previous`
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + Duration::microseconds(1))
}
