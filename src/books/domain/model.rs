use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::books::domain::Book;
use crate::books::domain::validator::{integer_value, validate_book};
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::date::serializer;

// BookEntity is the persisted shape of a catalog item, keyed by isbn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub category: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(isbn: &str, title: &str, author: &str, year: i64, category: &str) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            year,
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.isbn.to_string()
    }
}

impl Book for BookEntity {
    fn title(&self) -> &str {
        self.title.as_str()
    }

    fn year(&self) -> i64 {
        self.year
    }

    fn category(&self) -> &str {
        self.category.as_str()
    }
}

// BookDraft holds validated client fields before the store stamps them
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub category: String,
}

impl BookDraft {
    // from_payload runs the validator and then extracts typed fields, unknown keys are ignored
    pub fn from_payload(payload: &Value) -> LibraryResult<Self> {
        validate_book(payload).map_err(|message| LibraryError::validation(message.as_str(), None))?;
        Ok(Self {
            isbn: text_field(payload, "isbn")?,
            title: text_field(payload, "title")?,
            author: text_field(payload, "author")?,
            year: payload.get("year").and_then(integer_value)
                .ok_or_else(|| LibraryError::validation("year is not an integer", None))?,
            category: text_field(payload, "category")?,
        })
    }

    // to_entity stamps both timestamps with the current time
    pub fn to_entity(&self) -> BookEntity {
        BookEntity::new(self.isbn.as_str(), self.title.as_str(), self.author.as_str(),
                        self.year, self.category.as_str())
    }
}

// numbers and booleans are stored in their textual form, structured values are rejected
fn text_field(payload: &Value, name: &str) -> LibraryResult<String> {
    match payload.get(name) {
        Some(Value::String(s)) => Ok(s.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(LibraryError::validation(format!("{} must be a string", name).as_str(), None)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::books::domain::model::{BookDraft, BookEntity};
    use crate::core::domain::Identifiable;
    use crate::core::library::LibraryError;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookEntity::new("isbn", "title", "author", 2001, "Drama");
        assert_eq!("isbn", book.id());
        assert_eq!("title", book.title.as_str());
        assert_eq!(book.created_at, book.updated_at);
    }

    #[tokio::test]
    async fn test_should_build_draft_from_payload() {
        let draft = BookDraft::from_payload(&json!({
            "isbn": 9780441013593u64, "title": "Dune", "author": "Frank Herbert",
            "year": 1965.0, "category": "Science Fiction", "publisher": "ignored"}))
            .expect("should build draft");
        assert_eq!("9780441013593", draft.isbn);
        assert_eq!(1965, draft.year);
        let entity = draft.to_entity();
        assert_eq!("Science Fiction", entity.category);
    }

    #[tokio::test]
    async fn test_should_reject_invalid_payload() {
        let err = BookDraft::from_payload(&json!({"isbn": "1", "title": "A", "author": "X", "year": 1800, "category": "C"}))
            .expect_err("should fail");
        assert!(matches!(err, LibraryError::Validation { ref message, .. } if message == "Year must be an integer ≥ 1900"));
        let err = BookDraft::from_payload(&json!({"isbn": "1", "title": ["A"], "author": "X", "year": 2000, "category": "C"}))
            .expect_err("should fail");
        assert!(matches!(err, LibraryError::Validation { ref message, .. } if message == "title must be a string"));
        let err = BookDraft::from_payload(&json!({"isbn": "1", "title": "A", "author": {"name": "X"}, "year": 2000, "category": "C"}))
            .expect_err("should fail");
        assert_eq!("author must be a string", err.message());
    }
}
