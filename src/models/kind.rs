//! Per-kind descriptor driving the generic store and catalog service

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{
    postgres::{PgArguments, PgRow},
    FromRow, Postgres,
};
use validator::Validate;

use super::{
    audit::AuditAction,
    record::{CatalogRecord, RecordMeta},
};

/// `query_as` builder over PostgreSQL, as handed to [`CatalogKind::bind_columns`]
pub type PgQueryAs<'q, R> = sqlx::query::QueryAs<'q, Postgres, R, PgArguments>;

/// Everything that differs between two resource kinds.
///
/// One implementation exists per kind (books, authors, ...). The record
/// store, cache handling and audit trail are written once against this
/// trait.
pub trait CatalogKind: Send + Sync + 'static {
    /// Persisted record
    type Record: CatalogRecord
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + for<'r> FromRow<'r, PgRow>
        + Send
        + Sync
        + Unpin
        + 'static;

    /// Create request
    type Create: Debug + DeserializeOwned + Validate + Send + Sync + 'static;

    /// Partial update request; absent fields keep their prior values
    type Update: Debug + Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    /// Display name used in messages, e.g. `Book`
    const LABEL: &'static str;

    /// Table holding the records
    const TABLE: &'static str;

    /// Attribute columns, in the order [`CatalogKind::bind_columns`] binds them
    const COLUMNS: &'static [&'static str];

    /// Suffix of the audit action tags, e.g. `BOOK` in `CREATE_BOOK`
    const AUDIT_TAG: &'static str;

    /// Cache key of the "all active records" collection
    const CACHE_KEY: &'static str;

    /// Assemble a new record from a create request
    fn build(meta: RecordMeta, input: &Self::Create) -> Self::Record;

    /// Overlay the present fields of `changes` onto `record`
    fn merge(record: &mut Self::Record, changes: &Self::Update);

    /// `(constraint, value)` pairs that must be unique across all rows,
    /// active or not
    fn unique_values(record: &Self::Record) -> Vec<(&'static str, String)>;

    /// Client-facing message for a violated uniqueness constraint
    fn conflict_message(constraint: Option<&str>) -> String;

    /// Bind the attribute columns, in [`CatalogKind::COLUMNS`] order
    fn bind_columns<'q>(
        record: &'q Self::Record,
        query: PgQueryAs<'q, Self::Record>,
    ) -> PgQueryAs<'q, Self::Record>;

    /// Audit summary of a newly created record
    fn created_details(record: &Self::Record) -> Value;

    /// Audit snapshot of the values an update is about to replace
    fn previous_details(record: &Self::Record) -> Value;

    /// Audit summary of a removed record
    fn deleted_details(record: &Self::Record) -> Value;

    fn audit_action(action: AuditAction) -> String {
        action.tag(Self::AUDIT_TAG)
    }
}

/// Replace `target` when `value` is present
pub(crate) fn overlay<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// Replace a nullable `target` when `value` is present. An explicit `null`
/// (`Some(None)`) clears it.
pub(crate) fn overlay_opt<T: Clone>(target: &mut Option<T>, value: &Option<Option<T>>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
