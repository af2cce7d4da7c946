//! Author model

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::Validate;

use super::{
    kind::{overlay, CatalogKind, PgQueryAs},
    record::{CatalogRecord, RecordMeta},
};

/// Author record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub nationality: String,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthor {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Nationality is required"))]
    pub nationality: String,
}

/// Update author request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAuthor {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Nationality is required"))]
    pub nationality: Option<String>,
}

impl CatalogRecord for Author {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Descriptor for the `authors` collection. Authors carry no unique attribute.
pub struct Authors;

impl CatalogKind for Authors {
    type Record = Author;
    type Create = CreateAuthor;
    type Update = UpdateAuthor;

    const LABEL: &'static str = "Author";
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["name", "nationality"];
    const AUDIT_TAG: &'static str = "AUTHOR";
    const CACHE_KEY: &'static str = "all_authors";

    fn build(meta: RecordMeta, input: &CreateAuthor) -> Author {
        Author {
            meta,
            name: input.name.clone(),
            nationality: input.nationality.clone(),
        }
    }

    fn merge(record: &mut Author, changes: &UpdateAuthor) {
        overlay(&mut record.name, &changes.name);
        overlay(&mut record.nationality, &changes.nationality);
    }

    fn unique_values(_record: &Author) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn conflict_message(_constraint: Option<&str>) -> String {
        "Author already exists".to_string()
    }

    fn bind_columns<'q>(record: &'q Author, query: PgQueryAs<'q, Author>) -> PgQueryAs<'q, Author> {
        query.bind(&record.name).bind(&record.nationality)
    }

    fn created_details(record: &Author) -> Value {
        json!({ "id": record.meta.id, "name": record.name })
    }

    fn previous_details(record: &Author) -> Value {
        json!({ "name": record.name, "nationality": record.nationality })
    }

    fn deleted_details(record: &Author) -> Value {
        json!({ "id": record.meta.id })
    }
}
