//! Repository layer for record persistence

pub mod audit;
pub mod memory;
pub mod records;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Authors, Books, CatalogKind, Categories, Members, Publishers},
};

pub use memory::MemoryRecordStore;
pub use records::PgRecordStore;

/// Durable storage for one resource kind.
///
/// Uniqueness constraints span every row, including soft-deleted ones.
#[async_trait]
pub trait RecordStore<K: CatalogKind>: Send + Sync {
    /// Insert a new active record. Fails with `Conflict` on a uniqueness
    /// violation, in which case nothing is persisted.
    async fn create(&self, input: &K::Create) -> AppResult<K::Record>;

    /// Fetch an active record; inactive and unknown ids are both `NotFound`
    async fn find_active_by_id(&self, id: Uuid) -> AppResult<K::Record>;

    /// All active records, in no particular order
    async fn find_all_active(&self) -> AppResult<Vec<K::Record>>;

    /// Overlay `changes` onto the stored record and persist it. The caller
    /// checks the record is active beforehand.
    async fn merge_update(&self, id: Uuid, changes: &K::Update) -> AppResult<K::Record>;

    /// Flip `is_active` to false. `NotFound` if already inactive.
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
}

/// Record stores for every resource kind
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn RecordStore<Books>>,
    pub authors: Arc<dyn RecordStore<Authors>>,
    pub categories: Arc<dyn RecordStore<Categories>>,
    pub publishers: Arc<dyn RecordStore<Publishers>>,
    pub members: Arc<dyn RecordStore<Members>>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(PgRecordStore::<Books>::new(pool.clone())),
            authors: Arc::new(PgRecordStore::<Authors>::new(pool.clone())),
            categories: Arc::new(PgRecordStore::<Categories>::new(pool.clone())),
            publishers: Arc::new(PgRecordStore::<Publishers>::new(pool.clone())),
            members: Arc::new(PgRecordStore::<Members>::new(pool)),
        }
    }

    /// Create a repository keeping everything in process memory
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(MemoryRecordStore::<Books>::new()),
            authors: Arc::new(MemoryRecordStore::<Authors>::new()),
            categories: Arc::new(MemoryRecordStore::<Categories>::new()),
            publishers: Arc::new(MemoryRecordStore::<Publishers>::new()),
            members: Arc::new(MemoryRecordStore::<Members>::new()),
        }
    }
}
