//! PostgreSQL-backed audit log

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use crate::{
    models::AuditEntry,
    services::audit::{AuditError, AuditLog},
};

/// Appends audit entries to the `audit_log` table
#[derive(Clone)]
pub struct PgAuditLog {
    pool: Pool<Postgres>,
}

impl PgAuditLog {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (action, actor, details, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&entry.action)
        .bind(&entry.actor)
        .bind(Json(&entry.details))
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
