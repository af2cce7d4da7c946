//! Book model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::{
    kind::{overlay, CatalogKind, PgQueryAs},
    record::{CatalogRecord, RecordMeta},
};

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    /// Unique across all books, including removed ones
    pub isbn: String,
    /// Copies on hand
    pub stock: i32,
    pub price: Decimal,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
}

/// Update book request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBook {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
}

/// Largest value the `NUMERIC(10, 2)` price column holds
fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let message = if !price.is_sign_positive() || price.is_zero() {
        "Price must be a positive number"
    } else if *price > max_price() {
        "Price must not exceed 99999999.99"
    } else if price.normalize().scale() > 2 {
        "Price cannot have more than 2 decimal places"
    } else {
        return Ok(());
    };

    let mut error = ValidationError::new("price");
    error.message = Some(message.into());
    Err(error)
}

impl CatalogRecord for Book {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Descriptor for the `books` collection
pub struct Books;

impl CatalogKind for Books {
    type Record = Book;
    type Create = CreateBook;
    type Update = UpdateBook;

    const LABEL: &'static str = "Book";
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["title", "isbn", "stock", "price"];
    const AUDIT_TAG: &'static str = "BOOK";
    const CACHE_KEY: &'static str = "all_books";

    fn build(meta: RecordMeta, input: &CreateBook) -> Book {
        Book {
            meta,
            title: input.title.clone(),
            isbn: input.isbn.clone(),
            stock: input.stock,
            price: input.price,
        }
    }

    fn merge(record: &mut Book, changes: &UpdateBook) {
        overlay(&mut record.title, &changes.title);
        overlay(&mut record.isbn, &changes.isbn);
        overlay(&mut record.stock, &changes.stock);
        overlay(&mut record.price, &changes.price);
    }

    fn unique_values(record: &Book) -> Vec<(&'static str, String)> {
        vec![("books_isbn_key", record.isbn.clone())]
    }

    fn conflict_message(_constraint: Option<&str>) -> String {
        "A book with this ISBN already exists".to_string()
    }

    fn bind_columns<'q>(record: &'q Book, query: PgQueryAs<'q, Book>) -> PgQueryAs<'q, Book> {
        query
            .bind(&record.title)
            .bind(&record.isbn)
            .bind(record.stock)
            .bind(record.price)
    }

    fn created_details(record: &Book) -> Value {
        json!({ "title": record.title, "isbn": record.isbn })
    }

    fn previous_details(record: &Book) -> Value {
        json!({ "price": record.price, "stock": record.stock })
    }

    fn deleted_details(record: &Book) -> Value {
        json!({ "id": record.meta.id, "title": record.title })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample() -> Book {
        Books::build(
            RecordMeta::new(Uuid::new_v4()),
            &CreateBook {
                title: "Dune".to_string(),
                isbn: "978-0441013593".to_string(),
                stock: 5,
                price: Decimal::new(1000, 2),
            },
        )
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let mut book = sample();
        let before = book.clone();
        Books::merge(
            &mut book,
            &UpdateBook {
                stock: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(book.stock, 2);
        assert_eq!(book.title, before.title);
        assert_eq!(book.isbn, before.isbn);
        assert_eq!(book.price, before.price);
    }

    #[test]
    fn test_empty_update_serializes_empty() {
        let changes = serde_json::to_value(UpdateBook::default()).unwrap();
        assert_eq!(changes, json!({}));
    }

    #[test]
    fn test_validation() {
        let valid = CreateBook {
            title: "Dune".to_string(),
            isbn: "978-1".to_string(),
            stock: 0,
            price: Decimal::new(1, 0),
        };
        assert!(valid.validate().is_ok());

        let free = CreateBook {
            price: Decimal::ZERO,
            ..valid.clone()
        };
        assert!(free.validate().is_err());

        let negative_stock = CreateBook {
            stock: -1,
            ..valid.clone()
        };
        assert!(negative_stock.validate().is_err());
    }

    #[test]
    fn test_price_fits_column() {
        assert!(validate_price(&max_price()).is_ok());
        assert!(validate_price(&Decimal::new(10_000_000_000, 2)).is_err());
        assert!(validate_price(&Decimal::new(1_000_000_000_000, 0)).is_err());

        assert!(validate_price(&Decimal::new(10_005, 3)).is_err());
        // Trailing zeros are not extra precision
        assert!(validate_price(&Decimal::new(10_500, 3)).is_ok());

        let changes = UpdateBook {
            price: Some(Decimal::new(1_999, 3)),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let book = sample();
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["is_active"], json!(true));
        assert_eq!(value["isbn"], json!("978-0441013593"));
        let back: Book = serde_json::from_value(value).unwrap();
        assert_eq!(back, book);
    }
}
