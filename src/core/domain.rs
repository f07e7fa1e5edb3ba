use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
}

// Runtime selects how the books binary receives requests
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum Runtime {
    Http,
    Lambda,
}

impl From<String> for Runtime {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "lambda" => Runtime::Lambda,
            _ => Runtime::Http,
        }
    }
}

// Configuration abstracts config options for the books service
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub env: String,
    pub store: RepositoryStore,
    pub table_name: String,
    pub port: u16,
    pub runtime: Runtime,
    pub local_endpoint: String,
}

impl Configuration {
    pub fn new(env: &str, store: RepositoryStore) -> Self {
        Configuration {
            env: env.to_string(),
            store,
            table_name: "books".to_string(),
            port: 3000,
            runtime: Runtime::Http,
            local_endpoint: "http://localhost:8000".to_string(),
        }
    }

    pub fn from_env() -> LibraryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> LibraryResult<Self> {
        let store = lookup("BOOKS_STORE").map(RepositoryStore::from).unwrap_or(RepositoryStore::LocalDynamoDB);
        let mut config = Configuration::new(lookup("BOOKS_ENV").unwrap_or("dev".to_string()).as_str(), store);
        if let Some(table_name) = lookup("BOOKS_TABLE").filter(|t| !t.is_empty()) {
            config.table_name = table_name;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse::<u16>().map_err(|err| LibraryError::validation(
                format!("invalid PORT {} due to {}", port, err).as_str(), None))?;
        }
        if let Some(endpoint) = lookup("DYNAMODB_LOCAL_ENDPOINT").filter(|e| !e.is_empty()) {
            config.local_endpoint = endpoint;
        }
        if let Some(runtime) = lookup("BOOKS_RUNTIME") {
            config.runtime = Runtime::from(runtime);
        }
        Ok(config)
    }
}
