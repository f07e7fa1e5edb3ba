use tracing::warn;
use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::memory_book_repository::InMemoryBookRepository;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_book_repository(config: &Configuration) -> Box<dyn BookRepository> {
    match config.store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(config).await;
            Box::new(DDBBookRepository::new(client, config.table_name.as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(config).await;
            if let Err(err) = create_table(&client, config.table_name.as_str(), "isbn").await {
                // an existing table is the common case on restarts
                warn!(table = config.table_name.as_str(), "create table skipped: {}", err);
            }
            Box::new(DDBBookRepository::new(client, config.table_name.as_str()))
        }
        RepositoryStore::InMemory => {
            Box::new(InMemoryBookRepository::new())
        }
    }
}
