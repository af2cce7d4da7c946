//! Member (library patron) model

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::Validate;

use super::{
    kind::{overlay, overlay_opt, CatalogKind, PgQueryAs},
    record::{CatalogRecord, RecordMeta},
};

const EMAIL_CONSTRAINT: &str = "members_email_key";
const NUMBER_CONSTRAINT: &str = "members_member_number_key";

/// Member record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub email: String,
    /// Server-assigned card number (`MEM-XXXXXXXX`)
    pub member_number: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Create member request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMember {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Update member request. The member number cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
}

impl CatalogRecord for Member {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Card number derived from the record id
fn member_number(meta: &RecordMeta) -> String {
    let hex = meta.id.simple().to_string();
    format!("MEM-{}", hex[..8].to_ascii_uppercase())
}

/// Descriptor for the `members` collection
pub struct Members;

impl CatalogKind for Members {
    type Record = Member;
    type Create = CreateMember;
    type Update = UpdateMember;

    const LABEL: &'static str = "Member";
    const TABLE: &'static str = "members";
    const COLUMNS: &'static [&'static str] =
        &["name", "email", "member_number", "phone", "address"];
    const AUDIT_TAG: &'static str = "MEMBER";
    const CACHE_KEY: &'static str = "all_members";

    fn build(meta: RecordMeta, input: &CreateMember) -> Member {
        Member {
            member_number: member_number(&meta),
            meta,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
        }
    }

    fn merge(record: &mut Member, changes: &UpdateMember) {
        overlay(&mut record.name, &changes.name);
        overlay(&mut record.email, &changes.email);
        overlay_opt(&mut record.phone, &changes.phone);
        overlay_opt(&mut record.address, &changes.address);
    }

    fn unique_values(record: &Member) -> Vec<(&'static str, String)> {
        vec![
            (EMAIL_CONSTRAINT, record.email.clone()),
            (NUMBER_CONSTRAINT, record.member_number.clone()),
        ]
    }

    fn conflict_message(constraint: Option<&str>) -> String {
        match constraint {
            Some(NUMBER_CONSTRAINT) => "Member number collision, please retry".to_string(),
            _ => "This email is already registered".to_string(),
        }
    }

    fn bind_columns<'q>(record: &'q Member, query: PgQueryAs<'q, Member>) -> PgQueryAs<'q, Member> {
        query
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.member_number)
            .bind(&record.phone)
            .bind(&record.address)
    }

    fn created_details(record: &Member) -> Value {
        json!({
            "name": record.name,
            "email": record.email,
            "member_number": record.member_number,
        })
    }

    fn previous_details(record: &Member) -> Value {
        json!({
            "email": record.email,
            "phone": record.phone,
            "address": record.address,
        })
    }

    fn deleted_details(record: &Member) -> Value {
        json!({ "id": record.meta.id, "email": record.email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn create() -> CreateMember {
        CreateMember {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            phone: None,
            address: Some("12 St James's Square".to_string()),
        }
    }

    #[test]
    fn test_member_number_generated() {
        let member = Members::build(RecordMeta::new(Uuid::new_v4()), &create());
        assert!(member.member_number.starts_with("MEM-"));
        assert_eq!(member.member_number.len(), 12);
        assert_eq!(member.member_number, member.member_number.to_ascii_uppercase());
    }

    #[test]
    fn test_merge_never_touches_member_number() {
        let mut member = Members::build(RecordMeta::new(Uuid::new_v4()), &create());
        let number = member.member_number.clone();
        Members::merge(
            &mut member,
            &UpdateMember {
                email: Some("countess@example.org".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(member.member_number, number);
        assert_eq!(member.email, "countess@example.org");
        assert_eq!(member.address.as_deref(), Some("12 St James's Square"));
    }

    #[test]
    fn test_merge_clears_explicit_nulls() {
        let mut member = Members::build(RecordMeta::new(Uuid::new_v4()), &create());
        let changes: UpdateMember =
            serde_json::from_value(json!({ "address": null, "phone": "555-0100" })).unwrap();
        Members::merge(&mut member, &changes);
        assert_eq!(member.address, None);
        assert_eq!(member.phone.as_deref(), Some("555-0100"));
        assert_eq!(member.name, "Ada Lovelace");
    }

    #[test]
    fn test_conflict_messages() {
        assert_eq!(
            Members::conflict_message(Some(EMAIL_CONSTRAINT)),
            "This email is already registered"
        );
        assert!(Members::conflict_message(Some(NUMBER_CONSTRAINT)).contains("retry"));
    }

    #[test]
    fn test_email_validation() {
        let mut input = create();
        assert!(input.validate().is_ok());
        input.email = "not-an-email".to_string();
        assert!(input.validate().is_err());
    }
}
