//! PostgreSQL record store, one table per resource kind

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{CatalogKind, CatalogRecord, RecordMeta},
};

pub struct PgRecordStore<K> {
    pool: Pool<Postgres>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for PgRecordStore<K> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: CatalogKind> PgRecordStore<K> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("{} {} not found", K::LABEL, id))
    }

    /// Map unique violations to `Conflict`, everything else stays a database error
    fn write_error(error: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(ref db) = error {
            if db.is_unique_violation() {
                tracing::debug!(
                    "{} unique violation on {:?}",
                    K::LABEL,
                    db.constraint()
                );
                return AppError::Conflict(K::conflict_message(db.constraint()));
            }
        }
        AppError::Database(error)
    }

    fn insert_sql() -> String {
        let columns = K::COLUMNS.len();
        let placeholders: Vec<String> = (2..columns + 5).map(|i| format!("${}", i)).collect();
        format!(
            "INSERT INTO {} (id, {}, is_active, created_at, updated_at) \
             VALUES ($1, {}) RETURNING *",
            K::TABLE,
            K::COLUMNS.join(", "),
            placeholders.join(", ")
        )
    }

    /// `updated_at` never moves backwards, even when a concurrent writer
    /// committed a later timestamp after this one was read
    fn update_sql() -> String {
        let mut sets: Vec<String> = K::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 2))
            .collect();
        sets.push(format!(
            "updated_at = GREATEST(${}, updated_at + INTERVAL '1 microsecond')",
            K::COLUMNS.len() + 2
        ));
        format!(
            "UPDATE {} SET {} WHERE id = $1 RETURNING *",
            K::TABLE,
            sets.join(", ")
        )
    }
}

#[async_trait]
impl<K: CatalogKind> RecordStore<K> for PgRecordStore<K> {
    async fn create(&self, input: &K::Create) -> AppResult<K::Record> {
        let record = K::build(RecordMeta::new(Uuid::new_v4()), input);
        let meta = record.meta();
        let query = Self::insert_sql();

        let builder = sqlx::query_as::<_, K::Record>(&query).bind(meta.id);
        K::bind_columns(&record, builder)
            .bind(meta.is_active)
            .bind(meta.created_at)
            .bind(meta.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::write_error)
    }

    async fn find_active_by_id(&self, id: Uuid) -> AppResult<K::Record> {
        let query = format!("SELECT * FROM {} WHERE id = $1 AND is_active = TRUE", K::TABLE);
        sqlx::query_as::<_, K::Record>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn find_all_active(&self) -> AppResult<Vec<K::Record>> {
        let query = format!("SELECT * FROM {} WHERE is_active = TRUE", K::TABLE);
        let rows = sqlx::query_as::<_, K::Record>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn merge_update(&self, id: Uuid, changes: &K::Update) -> AppResult<K::Record> {
        let select = format!("SELECT * FROM {} WHERE id = $1", K::TABLE);
        let mut record = sqlx::query_as::<_, K::Record>(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        K::merge(&mut record, changes);
        record.meta_mut().touch();

        let query = Self::update_sql();
        let updated_at = record.meta().updated_at;
        let builder = sqlx::query_as::<_, K::Record>(&query).bind(id);
        K::bind_columns(&record, builder)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::write_error)?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let query = format!(
            r#"
            UPDATE {}
            SET is_active = FALSE,
                updated_at = GREATEST($2, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1 AND is_active = TRUE
            "#,
            K::TABLE
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(crate::models::record::now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
