//! Category model

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::Validate;

use super::{
    kind::{overlay, overlay_opt, CatalogKind, PgQueryAs},
    record::{CatalogRecord, RecordMeta},
};

/// Category record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub description: Option<String>,
}

/// Create category request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
}

/// Update category request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl CatalogRecord for Category {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Descriptor for the `categories` collection
pub struct Categories;

impl CatalogKind for Categories {
    type Record = Category;
    type Create = CreateCategory;
    type Update = UpdateCategory;

    const LABEL: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["name", "description"];
    const AUDIT_TAG: &'static str = "CATEGORY";
    const CACHE_KEY: &'static str = "all_categories";

    fn build(meta: RecordMeta, input: &CreateCategory) -> Category {
        Category {
            meta,
            name: input.name.clone(),
            description: input.description.clone(),
        }
    }

    fn merge(record: &mut Category, changes: &UpdateCategory) {
        overlay(&mut record.name, &changes.name);
        overlay_opt(&mut record.description, &changes.description);
    }

    fn unique_values(record: &Category) -> Vec<(&'static str, String)> {
        vec![("categories_name_key", record.name.clone())]
    }

    fn conflict_message(_constraint: Option<&str>) -> String {
        "A category with this name already exists".to_string()
    }

    fn bind_columns<'q>(
        record: &'q Category,
        query: PgQueryAs<'q, Category>,
    ) -> PgQueryAs<'q, Category> {
        query.bind(&record.name).bind(&record.description)
    }

    fn created_details(record: &Category) -> Value {
        json!({ "id": record.meta.id, "name": record.name })
    }

    fn previous_details(record: &Category) -> Value {
        json!({ "description": record.description })
    }

    fn deleted_details(record: &Category) -> Value {
        json!({ "id": record.meta.id, "name": record.name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample() -> Category {
        Categories::build(
            RecordMeta::new(Uuid::new_v4()),
            &CreateCategory {
                name: "Poetry".to_string(),
                description: Some("Verse".to_string()),
            },
        )
    }

    #[test]
    fn test_absent_description_is_kept() {
        let mut category = sample();
        let changes: UpdateCategory = serde_json::from_value(json!({ "name": "Poems" })).unwrap();
        assert_eq!(changes.description, None);
        Categories::merge(&mut category, &changes);
        assert_eq!(category.name, "Poems");
        assert_eq!(category.description.as_deref(), Some("Verse"));
    }

    #[test]
    fn test_null_description_is_cleared() {
        let mut category = sample();
        let changes: UpdateCategory =
            serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(changes.description, Some(None));
        Categories::merge(&mut category, &changes);
        assert_eq!(category.description, None);
        assert_eq!(category.name, "Poetry");

        // The audit trail records the explicit null
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!({ "description": null })
        );
    }
}
