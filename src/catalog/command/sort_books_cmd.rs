use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct SortBooksCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl SortBooksCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// raw `by` and `order` query parameters, whitelisted by the catalog
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SortBooksCommandRequest {
    pub by: Option<String>,
    pub order: Option<String>,
}

impl SortBooksCommandRequest {
    pub fn new(by: &str, order: &str) -> Self {
        Self {
            by: Some(by.to_string()),
            order: Some(order.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SortBooksCommandResponse {
    pub books: Vec<BookDto>,
}

impl SortBooksCommandResponse {
    pub fn new(books: Vec<BookDto>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<SortBooksCommandRequest, SortBooksCommandResponse> for SortBooksCommand {
    async fn execute(&self, req: SortBooksCommandRequest) -> Result<SortBooksCommandResponse, CommandError> {
        self.catalog_service.sort_books(req.by.as_deref(), req.order.as_deref())
            .await.map_err(CommandError::from).map(SortBooksCommandResponse::new)
    }
}
