use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::books::domain::model::BookEntity;
use crate::books::domain::{matches_category, sort_books};
use crate::books::repository::BookRepository;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, SortField, SortOrder};
use crate::core::repository::Repository;

// InMemoryBookRepository keeps books in insertion order behind a lock, the lock makes the
// isbn check and the insert one step so duplicates are rejected like a unique index would.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RwLock<Vec<BookEntity>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<BookEntity> for InMemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
        let mut books = self.books.write().await;
        if books.iter().any(|b| b.id() == entity.id()) {
            return Err(LibraryError::duplicate_key(
                format!("duplicate key isbn {}", entity.isbn).as_str()));
        }
        let now = Utc::now().naive_utc();
        let mut created = entity.clone();
        created.created_at = now;
        created.updated_at = now;
        books.push(created.clone());
        Ok(created)
    }

    async fn replace(&self, id: &str, entity: &BookEntity) -> LibraryResult<Option<BookEntity>> {
        let mut books = self.books.write().await;
        Ok(books.iter_mut().find(|b| b.id() == id).map(|existing| {
            existing.title = entity.title.to_string();
            existing.author = entity.author.to_string();
            existing.year = entity.year;
            existing.category = entity.category.to_string();
            existing.updated_at = Utc::now().naive_utc();
            existing.clone()
        }))
    }

    async fn get(&self, id: &str) -> LibraryResult<Option<BookEntity>> {
        let books = self.books.read().await;
        Ok(books.iter().find(|b| b.id() == id).cloned())
    }

    async fn delete(&self, id: &str) -> LibraryResult<Option<BookEntity>> {
        let mut books = self.books.write().await;
        Ok(books.iter().position(|b| b.id() == id).map(|ndx| books.remove(ndx)))
    }

    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
        Ok(self.books.read().await.clone())
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_by_category(&self, pattern: &str) -> LibraryResult<Vec<BookEntity>> {
        let books = self.books.read().await;
        Ok(books.iter().filter(|b| matches_category(*b, pattern)).cloned().collect())
    }

    async fn find_all_sorted(&self, field: SortField, order: SortOrder) -> LibraryResult<Vec<BookEntity>> {
        let mut books = self.find_all().await?;
        sort_books(&mut books, field, order);
        Ok(books)
    }
}
