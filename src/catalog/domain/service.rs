use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use crate::books::domain::model::{BookDraft, BookEntity};
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, SortField, SortOrder, BOOK_NOT_FOUND, CATEGORY_QUERY_REQUIRED, INVALID_SORT_QUERY, ISBN_MUST_BE_UNIQUE};

pub(crate) struct CatalogServiceImpl {
    book_repository: Box<dyn BookRepository>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(_config: &Configuration, book_repository: Box<dyn BookRepository>) -> Self {
        Self {
            book_repository,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn find_books(&self) -> LibraryResult<Vec<BookDto>> {
        let res = self.book_repository.find_all().await?;
        Ok(res.iter().map(BookDto::from).collect())
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(isbn).await?
            .map(|b| BookDto::from(&b))
            .ok_or_else(|| LibraryError::not_found(BOOK_NOT_FOUND))
    }

    // The lookup and the insert are two store calls, so concurrent creates of one isbn can
    // both pass the lookup. The store's own uniqueness constraint rejects the second insert
    // and that rejection is reported with the same message.
    async fn add_book(&self, payload: &Value) -> LibraryResult<BookDto> {
        let draft = BookDraft::from_payload(payload)?;
        if self.book_repository.get(draft.isbn.as_str()).await?.is_some() {
            debug!(isbn = draft.isbn.as_str(), "rejecting duplicate isbn");
            return Err(LibraryError::duplicate_key(ISBN_MUST_BE_UNIQUE));
        }
        let created = self.book_repository.create(&draft.to_entity()).await.map_err(|err| match err {
            LibraryError::DuplicateKey { message } => {
                warn!(isbn = draft.isbn.as_str(), "store rejected duplicate isbn: {}", message);
                LibraryError::duplicate_key(ISBN_MUST_BE_UNIQUE)
            }
            other => other,
        })?;
        info!(isbn = created.isbn.as_str(), "added book");
        Ok(BookDto::from(&created))
    }

    // the isbn inside the payload must be valid too, but the stored isbn never changes
    async fn update_book(&self, isbn: &str, payload: &Value) -> LibraryResult<BookDto> {
        let draft = BookDraft::from_payload(payload)?;
        let updated = self.book_repository.replace(isbn, &draft.to_entity()).await?
            .ok_or_else(|| LibraryError::not_found(BOOK_NOT_FOUND))?;
        info!(isbn, "updated book");
        Ok(BookDto::from(&updated))
    }

    async fn remove_book(&self, isbn: &str) -> LibraryResult<BookDto> {
        let removed = self.book_repository.delete(isbn).await?
            .ok_or_else(|| LibraryError::not_found(BOOK_NOT_FOUND))?;
        info!(isbn, "removed book");
        Ok(BookDto::from(&removed))
    }

    async fn search_by_category(&self, category: Option<&str>) -> LibraryResult<Vec<BookDto>> {
        let pattern = category.filter(|c| !c.is_empty()).map(str::to_lowercase)
            .ok_or_else(|| LibraryError::validation(CATEGORY_QUERY_REQUIRED, None))?;
        let res = self.book_repository.find_by_category(pattern.as_str()).await?;
        debug!(category = pattern.as_str(), matches = res.len(), "searched books");
        Ok(res.iter().map(BookDto::from).collect())
    }

    async fn sort_books(&self, by: Option<&str>, order: Option<&str>) -> LibraryResult<Vec<BookDto>> {
        let (field, order) = match (by.and_then(SortField::parse), order.and_then(SortOrder::parse)) {
            (Some(field), Some(order)) => (field, order),
            _ => return Err(LibraryError::validation(INVALID_SORT_QUERY, None)),
        };
        let res = self.book_repository.find_all_sorted(field, order).await?;
        Ok(res.iter().map(BookDto::from).collect())
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            title: other.title.to_string(),
            author: other.author.to_string(),
            year: other.year,
            category: other.category.to_string(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::BookDto;
    use crate::books::repository::BookRepository;
    use crate::books::repository::memory_book_repository::InMemoryBookRepository;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::domain::service::CatalogServiceImpl;
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, LibraryResult, SortField, SortOrder};
    use crate::core::repository::{Repository, RepositoryStore};

    fn build_service() -> CatalogServiceImpl {
        CatalogServiceImpl::new(&Configuration::new("test", RepositoryStore::InMemory),
                                Box::new(InMemoryBookRepository::new()))
    }

    fn payload(isbn: &str, title: &str, year: i64, category: &str) -> Value {
        json!({"isbn": isbn, "title": title, "author": "X", "year": year, "category": category})
    }

    fn assert_validation(res: LibraryResult<BookDto>, expected: &str) {
        match res {
            Err(LibraryError::Validation { message, .. }) => assert_eq!(expected, message),
            other => panic!("expected validation error {} but was {:?}", expected, other),
        }
    }

    #[tokio::test]
    async fn test_should_add_and_find_book() {
        let catalog_svc = build_service();
        let created = catalog_svc.add_book(&payload("111", "A", 2000, "Drama")).await.expect("should add book");
        assert_eq!("111", created.isbn);

        let loaded = catalog_svc.find_book_by_isbn("111").await.expect("should return book");
        assert_eq!(created.title, loaded.title);
        assert_eq!(created.author, loaded.author);
        assert_eq!(created.year, loaded.year);
        assert_eq!(created.category, loaded.category);
        assert_eq!(1, catalog_svc.find_books().await.expect("should list").len());
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn() {
        let catalog_svc = build_service();
        let _ = catalog_svc.add_book(&payload("111", "A", 2000, "Drama")).await.expect("should add book");
        let res = catalog_svc.add_book(&payload("111", "Other", 2005, "Drama")).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { ref message }) if message == "ISBN must be unique"));
        let loaded = catalog_svc.find_book_by_isbn("111").await.expect("should return book");
        assert_eq!("A", loaded.title);
    }

    #[tokio::test]
    async fn test_should_validate_before_lookup() {
        let catalog_svc = build_service();
        assert_validation(catalog_svc.add_book(&json!({"title": "A"})).await, "ISBN is required");
        assert_validation(catalog_svc.add_book(&json!({"isbn": "1", "author": "X"})).await, "Title is required");
        assert_validation(catalog_svc.add_book(&json!({"isbn": "1", "title": "A"})).await, "Author is required");
        assert_validation(catalog_svc.add_book(&json!({"isbn": "1", "title": "A", "author": "X", "year": 2000})).await,
                          "Category is required");
        assert_validation(catalog_svc.add_book(&payload("1", "A", 1899, "Drama")).await, "Year must be an integer ≥ 1900");
        assert_validation(catalog_svc.update_book("1", &json!({"title": "A"})).await, "ISBN is required");
        assert!(catalog_svc.find_books().await.expect("should list").is_empty());
    }

    #[tokio::test]
    async fn test_should_update_book_but_keep_isbn() {
        let catalog_svc = build_service();
        let created = catalog_svc.add_book(&payload("111", "A", 2000, "Drama")).await.expect("should add book");

        let updated = catalog_svc.update_book("111", &payload("222", "B", 2001, "Poetry")).await
            .expect("should update book");
        assert_eq!("111", updated.isbn);
        assert_eq!("B", updated.title);
        assert_eq!(2001, updated.year);
        assert_eq!(created.created_at, updated.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert!(matches!(catalog_svc.find_book_by_isbn("222").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_report_missing_books() {
        let catalog_svc = build_service();
        let valid = payload("404", "A", 2000, "Drama");
        for res in [
            catalog_svc.find_book_by_isbn("404").await,
            catalog_svc.update_book("404", &valid).await,
            catalog_svc.remove_book("404").await,
        ] {
            assert!(matches!(res, Err(LibraryError::NotFound { ref message }) if message == "Book not found"));
        }
    }

    #[tokio::test]
    async fn test_should_run_book_lifecycle() {
        let catalog_svc = build_service();
        let created = catalog_svc.add_book(&payload("111", "A", 2000, "Drama")).await.expect("should add book");
        assert_eq!("111", created.isbn);
        assert!(matches!(catalog_svc.add_book(&payload("111", "B", 2000, "Drama")).await,
            Err(LibraryError::DuplicateKey { .. })));
        let updated = catalog_svc.update_book("111", &payload("111", "B", 2001, "Drama")).await.expect("should update");
        assert_eq!(2001, updated.year);
        let removed = catalog_svc.remove_book("111").await.expect("should remove");
        assert_eq!("B", removed.title);
        assert!(matches!(catalog_svc.find_book_by_isbn("111").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_search_by_category() {
        let catalog_svc = build_service();
        let _ = catalog_svc.add_book(&payload("1", "Dune", 1965, "Science Fiction")).await.expect("should add");
        let _ = catalog_svc.add_book(&payload("2", "SPQR", 2015, "History")).await.expect("should add");
        for query in ["fiction", "FICTION", "Science"] {
            let res = catalog_svc.search_by_category(Some(query)).await.expect("should search");
            assert_eq!(vec!["1".to_string()], res.iter().map(|b| b.isbn.to_string()).collect::<Vec<_>>());
        }
        assert!(catalog_svc.search_by_category(Some("poetry")).await.expect("should search").is_empty());
        for query in [None, Some("")] {
            let res = catalog_svc.search_by_category(query).await;
            assert!(matches!(res, Err(LibraryError::Validation { ref message, .. }) if message == "Category query is required"));
        }
    }

    #[tokio::test]
    async fn test_should_sort_books() {
        let catalog_svc = build_service();
        for (isbn, title, year) in [("1", "Mango", 2001), ("2", "Apple", 1999), ("3", "Zebra", 2010), ("4", "Kiwi", 1999)] {
            let _ = catalog_svc.add_book(&payload(isbn, title, year, "Drama")).await.expect("should add");
        }
        let res = catalog_svc.sort_books(Some("year"), Some("asc")).await.expect("should sort");
        assert!(res.windows(2).all(|w| w[0].year <= w[1].year));
        let res = catalog_svc.sort_books(Some("title"), Some("desc")).await.expect("should sort");
        let titles: Vec<&str> = res.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(vec!["Zebra", "Mango", "Kiwi", "Apple"], titles);

        for (by, order) in [(Some("author"), Some("asc")), (Some("year"), Some("up")), (None, Some("asc")),
                            (Some("title"), None), (Some("TITLE"), Some("asc"))] {
            let res = catalog_svc.sort_books(by, order).await;
            assert!(matches!(res, Err(LibraryError::Validation { ref message, .. }) if message == "Invalid sort query"));
        }
    }

    struct UnreachableRepository;

    #[async_trait]
    impl Repository<BookEntity> for UnreachableRepository {
        async fn create(&self, _entity: &BookEntity) -> LibraryResult<BookEntity> {
            Err(LibraryError::database("connection refused", None, true))
        }
        async fn replace(&self, _id: &str, _entity: &BookEntity) -> LibraryResult<Option<BookEntity>> {
            Err(LibraryError::database("connection refused", None, true))
        }
        async fn get(&self, _id: &str) -> LibraryResult<Option<BookEntity>> {
            Err(LibraryError::database("connection refused", None, true))
        }
        async fn delete(&self, _id: &str) -> LibraryResult<Option<BookEntity>> {
            Err(LibraryError::database("connection refused", None, true))
        }
        async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
            Err(LibraryError::database("connection refused", None, true))
        }
    }

    #[async_trait]
    impl BookRepository for UnreachableRepository {
        async fn find_by_category(&self, _pattern: &str) -> LibraryResult<Vec<BookEntity>> {
            Err(LibraryError::database("connection refused", None, true))
        }
        async fn find_all_sorted(&self, _field: SortField, _order: SortOrder) -> LibraryResult<Vec<BookEntity>> {
            Err(LibraryError::database("connection refused", None, true))
        }
    }

    #[tokio::test]
    async fn test_should_propagate_store_failures() {
        let catalog_svc = CatalogServiceImpl::new(&Configuration::new("test", RepositoryStore::InMemory),
                                                  Box::new(UnreachableRepository));
        assert!(matches!(catalog_svc.find_books().await, Err(LibraryError::Database { .. })));
        assert!(matches!(catalog_svc.add_book(&payload("1", "A", 2000, "Drama")).await, Err(LibraryError::Database { .. })));
        assert!(matches!(catalog_svc.search_by_category(Some("drama")).await, Err(LibraryError::Database { .. })));
        assert!(matches!(catalog_svc.sort_books(Some("year"), Some("asc")).await, Err(LibraryError::Database { .. })));
        // parameter checks still win over store failures
        assert!(matches!(catalog_svc.sort_books(Some("pages"), Some("asc")).await, Err(LibraryError::Validation { .. })));
    }

    // a store whose unique index is the only line of defense, as in a lost create race
    struct RacingRepository(InMemoryBookRepository);

    #[async_trait]
    impl Repository<BookEntity> for RacingRepository {
        async fn create(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
            self.0.create(entity).await
        }
        async fn replace(&self, id: &str, entity: &BookEntity) -> LibraryResult<Option<BookEntity>> {
            self.0.replace(id, entity).await
        }
        async fn get(&self, _id: &str) -> LibraryResult<Option<BookEntity>> {
            Ok(None)
        }
        async fn delete(&self, id: &str) -> LibraryResult<Option<BookEntity>> {
            self.0.delete(id).await
        }
        async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
            self.0.find_all().await
        }
    }

    #[async_trait]
    impl BookRepository for RacingRepository {
        async fn find_by_category(&self, pattern: &str) -> LibraryResult<Vec<BookEntity>> {
            self.0.find_by_category(pattern).await
        }
        async fn find_all_sorted(&self, field: SortField, order: SortOrder) -> LibraryResult<Vec<BookEntity>> {
            self.0.find_all_sorted(field, order).await
        }
    }

    #[tokio::test]
    async fn test_should_report_store_uniqueness_violation_as_conflict() {
        let catalog_svc = CatalogServiceImpl::new(&Configuration::new("test", RepositoryStore::InMemory),
                                                  Box::new(RacingRepository(InMemoryBookRepository::new())));
        let _ = catalog_svc.add_book(&payload("1", "A", 2000, "Drama")).await.expect("should add");
        let res = catalog_svc.add_book(&payload("1", "B", 2000, "Drama")).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { ref message }) if message == "ISBN must be unique"));
        assert_eq!(1, catalog_svc.find_books().await.expect("should list").len());
    }
}
