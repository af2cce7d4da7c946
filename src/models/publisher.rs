//! Publisher model

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::Validate;

use super::{
    kind::{overlay, overlay_opt, CatalogKind, PgQueryAs},
    record::{CatalogRecord, RecordMeta},
};

/// Publisher record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Publisher {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub website: Option<String>,
    pub country: Option<String>,
}

/// Create publisher request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePublisher {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    pub country: Option<String>,
}

/// Update publisher request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePublisher {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<Option<String>>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<Option<String>>,
}

impl CatalogRecord for Publisher {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Descriptor for the `publishers` collection
pub struct Publishers;

impl CatalogKind for Publishers {
    type Record = Publisher;
    type Create = CreatePublisher;
    type Update = UpdatePublisher;

    const LABEL: &'static str = "Publisher";
    const TABLE: &'static str = "publishers";
    const COLUMNS: &'static [&'static str] = &["name", "website", "country"];
    const AUDIT_TAG: &'static str = "PUBLISHER";
    const CACHE_KEY: &'static str = "all_publishers";

    fn build(meta: RecordMeta, input: &CreatePublisher) -> Publisher {
        Publisher {
            meta,
            name: input.name.clone(),
            website: input.website.clone(),
            country: input.country.clone(),
        }
    }

    fn merge(record: &mut Publisher, changes: &UpdatePublisher) {
        overlay(&mut record.name, &changes.name);
        overlay_opt(&mut record.website, &changes.website);
        overlay_opt(&mut record.country, &changes.country);
    }

    fn unique_values(record: &Publisher) -> Vec<(&'static str, String)> {
        vec![("publishers_name_key", record.name.clone())]
    }

    fn conflict_message(_constraint: Option<&str>) -> String {
        "A publisher with this name already exists".to_string()
    }

    fn bind_columns<'q>(
        record: &'q Publisher,
        query: PgQueryAs<'q, Publisher>,
    ) -> PgQueryAs<'q, Publisher> {
        query
            .bind(&record.name)
            .bind(&record.website)
            .bind(&record.country)
    }

    fn created_details(record: &Publisher) -> Value {
        json!({ "id": record.meta.id, "name": record.name })
    }

    fn previous_details(record: &Publisher) -> Value {
        json!({ "website": record.website, "country": record.country })
    }

    fn deleted_details(record: &Publisher) -> Value {
        json!({ "id": record.meta.id, "name": record.name })
    }
}
