//! Data models for the catalog

pub mod audit;
pub mod author;
pub mod book;
pub mod category;
pub mod kind;
pub mod member;
pub mod publisher;
pub mod record;

// Re-export commonly used types
pub use audit::{Actor, AuditAction, AuditEntry};
pub use author::{Author, Authors};
pub use book::{Book, Books};
pub use category::{Categories, Category};
pub use kind::CatalogKind;
pub use member::{Member, Members};
pub use publisher::{Publisher, Publishers};
pub use record::{CatalogRecord, RecordMeta, Removed};
