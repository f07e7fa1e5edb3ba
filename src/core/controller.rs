use std::sync::Arc;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};
use tracing::error;
use crate::catalog::domain::CatalogService;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Configuration,
    pub(crate) catalog: Arc<dyn CatalogService>,
}

impl AppState {
    pub fn new(config: Configuration, catalog: Arc<dyn CatalogService>) -> AppState {
        AppState {
            config,
            catalog,
        }
    }
}

// every failure leaves the API as {"error": "<message>"}
pub(crate) type ServerError = (StatusCode, Json<Value>);

pub(crate) fn server_error(status: StatusCode, message: &str) -> ServerError {
    (status, Json(json!({ "error": message })))
}

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    server_error(StatusCode::BAD_REQUEST, format!("{}", err).as_str())
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Database { .. } | CommandError::Runtime { .. } | CommandError::Serialization { .. } | CommandError::Other { .. } => {
                error!("request failed: {:?}", err);
                server_error(StatusCode::INTERNAL_SERVER_ERROR, err.message())
            }
            CommandError::DuplicateKey { .. } => {
                server_error(StatusCode::BAD_REQUEST, err.message())
            }
            CommandError::NotFound { .. } => {
                server_error(StatusCode::NOT_FOUND, err.message())
            }
            CommandError::Validation { .. } => {
                server_error(StatusCode::BAD_REQUEST, err.message())
            }
        }
    }
}
