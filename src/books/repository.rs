pub mod ddb_book_repository;
pub mod memory_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryResult, SortField, SortOrder};
use crate::core::repository::Repository;

// BookRepository adds the catalog queries on top of the keyed operations. Implementations
// must back `create` with a store-side uniqueness constraint on isbn.
#[async_trait]
pub trait BookRepository: Repository<BookEntity> {
    // books whose category contains pattern, ignoring case
    async fn find_by_category(&self, pattern: &str) -> LibraryResult<Vec<BookEntity>>;

    async fn find_all_sorted(&self, field: SortField, order: SortOrder) -> LibraryResult<Vec<BookEntity>>;
}
