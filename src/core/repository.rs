use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::library::LibraryResult;

// Repository is the document-store contract consumed by domain services. Lookups that miss
// return Ok(None) so that callers decide how absence is reported.
#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // inserts an entity, the store must reject a second entity with the same id
    // with LibraryError::DuplicateKey
    async fn create(&self, entity: &Entity) -> LibraryResult<Entity>;

    // replaces all mutable fields of the entity with the given id and returns the new state
    async fn replace(&self, id: &str, entity: &Entity) -> LibraryResult<Option<Entity>>;

    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Option<Entity>>;

    // removes an entity and returns what was removed
    async fn delete(&self, id: &str) -> LibraryResult<Option<Entity>>;

    // all entities in store iteration order
    async fn find_all(&self) -> LibraryResult<Vec<Entity>>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
    InMemory,
}

impl From<String> for RepositoryStore {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "dynamodb" => RepositoryStore::DynamoDB,
            "memory" => RepositoryStore::InMemory,
            _ => RepositoryStore::LocalDynamoDB,
        }
    }
}
