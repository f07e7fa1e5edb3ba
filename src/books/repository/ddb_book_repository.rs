use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::domain::{matches_category, sort_books};
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, SortField, SortOrder};
use crate::core::repository::Repository;
use crate::utils::ddb::{is_conditional_check_failed, parse_date_attribute, parse_number_attribute, parse_string_attribute, string_date};

const SCAN_PAGE_SIZE: i32 = 500;

#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    // reads the whole table, following last_evaluated_key until the scan is exhausted
    async fn scan(&self) -> LibraryResult<Vec<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let mut records = vec![];
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let res = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key.take())
                .limit(SCAN_PAGE_SIZE)
                .send()
                .await.map_err(LibraryError::from)?;
            records.extend(res.items().unwrap_or_default().iter().map(map_to_book));
            match res.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => return Ok(records),
            }
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
        let table_name: &str = self.table_name.as_ref();
        let now = Utc::now().naive_utc();
        let mut created = entity.clone();
        created.created_at = now;
        created.updated_at = now;
        match self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(isbn)")
            .set_item(Some(to_item(&created)))
            .send()
            .await {
            Ok(_) => Ok(created),
            Err(err) if is_conditional_check_failed(&err) => {
                Err(LibraryError::duplicate_key(format!("duplicate key isbn {}", entity.isbn).as_str()))
            }
            Err(err) => Err(LibraryError::from(err)),
        }
    }

    // Note `year` is a reserved word per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn replace(&self, id: &str, entity: &BookEntity) -> LibraryResult<Option<BookEntity>> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        match self.client
            .update_item()
            .table_name(table_name)
            .key("isbn", AttributeValue::S(id.to_string()))
            .update_expression("SET #title = :title, #author = :author, #year = :year, #category = :category, updated_at = :updated_at")
            .expression_attribute_names("#title", "title")
            .expression_attribute_names("#author", "author")
            .expression_attribute_names("#year", "year")
            .expression_attribute_names("#category", "category")
            .expression_attribute_values(":title", AttributeValue::S(entity.title.to_string()))
            .expression_attribute_values(":author", AttributeValue::S(entity.author.to_string()))
            .expression_attribute_values(":year", AttributeValue::N(entity.year.to_string()))
            .expression_attribute_values(":category", AttributeValue::S(entity.category.to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(isbn)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await {
            Ok(out) => Ok(out.attributes().map(map_to_book)),
            Err(err) if is_conditional_check_failed(&err) => Ok(None),
            Err(err) => Err(LibraryError::from(err)),
        }
    }

    async fn get(&self, id: &str) -> LibraryResult<Option<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .get_item()
            .table_name(table_name)
            .consistent_read(true)
            .key("isbn", AttributeValue::S(id.to_string()))
            .send()
            .await.map_err(LibraryError::from).map(|res| res.item().map(map_to_book))
    }

    async fn delete(&self, id: &str) -> LibraryResult<Option<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("isbn", AttributeValue::S(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await.map_err(LibraryError::from).map(|res| res.attributes().map(map_to_book))
    }

    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
        self.scan().await
    }
}

// DynamoDB has neither case-insensitive contains nor ordered scans, both run over the scan.
#[async_trait]
impl BookRepository for DDBBookRepository {
    async fn find_by_category(&self, pattern: &str) -> LibraryResult<Vec<BookEntity>> {
        let books = self.scan().await?;
        Ok(books.into_iter().filter(|b| matches_category(b, pattern)).collect())
    }

    async fn find_all_sorted(&self, field: SortField, order: SortOrder) -> LibraryResult<Vec<BookEntity>> {
        let mut books = self.scan().await?;
        sort_books(&mut books, field, order);
        Ok(books)
    }
}

fn to_item(book: &BookEntity) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("isbn".to_string(), AttributeValue::S(book.isbn.to_string())),
        ("title".to_string(), AttributeValue::S(book.title.to_string())),
        ("author".to_string(), AttributeValue::S(book.author.to_string())),
        ("year".to_string(), AttributeValue::N(book.year.to_string())),
        ("category".to_string(), AttributeValue::S(book.category.to_string())),
        ("created_at".to_string(), string_date(book.created_at)),
        ("updated_at".to_string(), string_date(book.updated_at)),
    ])
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        isbn: parse_string_attribute("isbn", map).unwrap_or(String::from("")),
        title: parse_string_attribute("title", map).unwrap_or(String::from("")),
        author: parse_string_attribute("author", map).unwrap_or(String::from("")),
        year: parse_number_attribute("year", map),
        category: parse_string_attribute("category", map).unwrap_or(String::from("")),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;

    use crate::books::domain::model::BookEntity;
    use crate::books::repository::BookRepository;
    use crate::books::repository::ddb_book_repository::{map_to_book, to_item, DDBBookRepository};
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, SortField, SortOrder};
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(&Configuration::new("test", RepositoryStore::LocalDynamoDB)).await;
                let _ = delete_table(&client, "test_books").await;
                let _ = create_table(&client, "test_books", "isbn").await;
                client
            });
    }

    #[tokio::test]
    async fn test_should_map_items() {
        let book = BookEntity::new("isbn", "test book", "author", 1999, "Drama");
        let loaded = map_to_book(&to_item(&book));
        assert_eq!(book, loaded);
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_get_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "test_books");
        let book = BookEntity::new("ddb_isbn_1", "test book", "author", 2000, "Drama");
        let created = books_repo.create(&book).await.expect("should create book");
        assert_eq!(book.isbn, created.isbn);

        let loaded = books_repo.get("ddb_isbn_1").await.expect("should return book").expect("should exist");
        assert_eq!(created.title, loaded.title);

        let res = books_repo.create(&book).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_replace_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "test_books");
        let book = BookEntity::new("ddb_isbn_2", "test book", "author", 2000, "Drama");
        let _ = books_repo.create(&book).await.expect("should create book");

        let replacement = BookEntity::new("ddb_isbn_2", "new title", "author", 2001, "Drama");
        let updated = books_repo.replace("ddb_isbn_2", &replacement).await.expect("should update book")
            .expect("should exist");
        assert_eq!("new title", updated.title);
        assert_eq!(2001, updated.year);

        let missing = books_repo.replace("ddb_missing", &replacement).await.expect("should query");
        assert!(missing.is_none());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_delete_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "test_books");
        let book = BookEntity::new("ddb_isbn_3", "test book", "author", 2000, "Drama");
        let _ = books_repo.create(&book).await.expect("should create book");

        let deleted = books_repo.delete("ddb_isbn_3").await.expect("should delete book");
        assert_eq!(Some("ddb_isbn_3".to_string()), deleted.map(|b| b.isbn));

        assert!(books_repo.get("ddb_isbn_3").await.expect("should query").is_none());
        assert!(books_repo.delete("ddb_isbn_3").await.expect("should query").is_none());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_query_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "test_books");
        for i in 0..20 {
            let category = if i % 4 == 0 { "Science Fiction" } else { "History" };
            let book = BookEntity::new(format!("ddb_query_{}", i).as_str(),
                                       format!("title_{}", i).as_str(), "author", 1950 + i, category);
            let _ = books_repo.create(&book).await.expect("should create book");
        }
        let res = books_repo.find_by_category("science fiction").await.expect("should return books");
        assert!(res.len() >= 5);
        let res = books_repo.find_all_sorted(SortField::Year, SortOrder::Asc).await.expect("should return books");
        assert!(res.windows(2).all(|w| w[0].year <= w[1].year));
    }
}
