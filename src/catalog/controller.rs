use axum::{
    body::{Bytes, HttpBody},
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    BoxError,
    Router,
};
use serde_json::{Map, Value};
use crate::books::dto::BookDto;
use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest};
use crate::catalog::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest};
use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
use crate::catalog::command::search_books_cmd::{SearchBooksCommand, SearchBooksCommandRequest};
use crate::catalog::command::sort_books_cmd::{SortBooksCommand, SortBooksCommandRequest};
use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest};
use crate::catalog::middleware::{content_type_check, log_request};
use crate::catalog::swagger::swagger;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, server_error, ServerError};
use crate::core::library::{INVALID_SORT_QUERY, METHOD_NOT_ALLOWED, ROUTE_NOT_FOUND};

// static segments are matched before /books/:isbn, B is the body type of the hosting runtime
pub(crate) fn build_router<B>(state: AppState) -> Router<(), B>
    where B: HttpBody + Send + 'static, B::Data: Send, B::Error: Into<BoxError> {
    Router::new()
        .route("/books", get(list_books).post(add_book).fallback(method_not_allowed))
        .route("/books/search", get(search_books).fallback(method_not_allowed))
        .route("/books/sort", get(sort_books).fallback(method_not_allowed))
        .route("/books/:isbn",
               get(find_book_by_isbn).put(update_book).delete(remove_book).fallback(method_not_allowed))
        .route("/swagger", get(swagger).fallback(method_not_allowed))
        .fallback(route_not_found)
        .layer(middleware::from_fn(content_type_check::<B>))
        .layer(middleware::from_fn(log_request::<B>))
        .with_state(state)
}

// an empty body reads as an empty object so that validation reports the missing fields
fn parse_body(body: &Bytes) -> Result<Value, ServerError> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(json_to_server_error)
}

async fn route_not_found() -> ServerError {
    server_error(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND)
}

async fn method_not_allowed() -> ServerError {
    server_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}

pub(crate) async fn list_books(
    State(state): State<AppState>) -> Result<Json<Vec<BookDto>>, ServerError> {
    let res = ListBooksCommand::new(state.catalog).execute(ListBooksCommandRequest::default()).await?;
    Ok(Json(res.books))
}

pub(crate) async fn find_book_by_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>) -> Result<Json<BookDto>, ServerError> {
    let req = GetBookCommandRequest::new(isbn);
    let res = GetBookCommand::new(state.catalog).execute(req).await?;
    Ok(Json(res.book))
}

pub(crate) async fn add_book(
    State(state): State<AppState>,
    body: Bytes) -> Result<(StatusCode, Json<BookDto>), ServerError> {
    let req = AddBookCommandRequest::new(parse_body(&body)?);
    let res = AddBookCommand::new(state.catalog).execute(req).await?;
    Ok((StatusCode::CREATED, Json(res.book)))
}

pub(crate) async fn update_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    body: Bytes) -> Result<Json<BookDto>, ServerError> {
    let req = UpdateBookCommandRequest::new(isbn.as_str(), parse_body(&body)?);
    let res = UpdateBookCommand::new(state.catalog).execute(req).await?;
    Ok(Json(res.book))
}

pub(crate) async fn remove_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>) -> Result<Json<BookDto>, ServerError> {
    let req = RemoveBookCommandRequest::new(isbn.as_str());
    let res = RemoveBookCommand::new(state.catalog).execute(req).await?;
    Ok(Json(res.book))
}

pub(crate) async fn search_books(
    State(state): State<AppState>,
    query: Result<Query<SearchBooksCommandRequest>, QueryRejection>) -> Result<Json<Vec<BookDto>>, ServerError> {
    let Query(req) = query
        .map_err(|rejection| server_error(StatusCode::BAD_REQUEST, rejection.to_string().as_str()))?;
    let res = SearchBooksCommand::new(state.catalog).execute(req).await?;
    Ok(Json(res.books))
}

pub(crate) async fn sort_books(
    State(state): State<AppState>,
    query: Result<Query<SortBooksCommandRequest>, QueryRejection>) -> Result<Json<Vec<BookDto>>, ServerError> {
    // repeated or malformed by/order parameters are just another invalid sort query
    let Query(req) = query
        .map_err(|_| server_error(StatusCode::BAD_REQUEST, INVALID_SORT_QUERY))?;
    let res = SortBooksCommand::new(state.catalog).execute(req).await?;
    Ok(Json(res.books))
}
