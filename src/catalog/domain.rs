pub mod service;

use async_trait::async_trait;
use serde_json::Value;
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;

// CatalogService owns the business rules of the books API: payload validation, isbn
// uniqueness on create, category search and whitelisted sorting.
#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn find_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn add_book(&self, payload: &Value) -> LibraryResult<BookDto>;
    async fn update_book(&self, isbn: &str, payload: &Value) -> LibraryResult<BookDto>;
    async fn remove_book(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn search_by_category(&self, category: Option<&str>) -> LibraryResult<Vec<BookDto>>;
    async fn sort_books(&self, by: Option<&str>, order: Option<&str>) -> LibraryResult<Vec<BookDto>>;
}
