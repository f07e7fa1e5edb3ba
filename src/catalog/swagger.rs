use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};
use crate::core::controller::AppState;

pub(crate) async fn swagger(State(state): State<AppState>) -> Json<Value> {
    Json(openapi_document(state.config.port))
}

// OpenAPI 3 description of the /books routes
pub(crate) fn openapi_document(port: u16) -> Value {
    let error = json!({ "$ref": "#/components/schemas/Error" });
    let book = json!({ "$ref": "#/components/schemas/Book" });
    let books = json!({ "type": "array", "items": book });
    let isbn_param = json!({ "name": "isbn", "in": "path", "required": true, "schema": { "type": "string" } });
    let book_input = json!({
        "required": true,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookInput" } } }
    });
    let respond = |description: &str, schema: &Value| json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    });
    let list_books = json!({
        "get": {
            "summary": "List all books",
            "responses": { "200": respond("All books", &books), "500": respond("Store failure", &error) }
        },
        "post": {
            "summary": "Create a book",
            "requestBody": book_input,
            "responses": {
                "201": respond("Created book", &book),
                "400": respond("Invalid payload or duplicate ISBN", &error),
                "500": respond("Store failure", &error)
            }
        }
    });
    let search_books = json!({
        "get": {
            "summary": "Search books by category, case-insensitive partial match",
            "parameters": [{ "name": "category", "in": "query", "required": true, "schema": { "type": "string" } }],
            "responses": {
                "200": respond("Matching books", &books),
                "400": respond("Missing category", &error),
                "500": respond("Store failure", &error)
            }
        }
    });
    let sort_books = json!({
        "get": {
            "summary": "List books sorted by title or year",
            "parameters": [
                { "name": "by", "in": "query", "required": true, "schema": { "type": "string", "enum": ["title", "year"] } },
                { "name": "order", "in": "query", "required": true, "schema": { "type": "string", "enum": ["asc", "desc"] } }
            ],
            "responses": {
                "200": respond("Sorted books", &books),
                "400": respond("Invalid sort query", &error),
                "500": respond("Store failure", &error)
            }
        }
    });
    let get_book = json!({
        "summary": "Get a book by ISBN",
        "parameters": [isbn_param],
        "responses": {
            "200": respond("The book", &book),
            "404": respond("Book not found", &error),
            "500": respond("Store failure", &error)
        }
    });
    let put_book = json!({
        "summary": "Replace a book, the ISBN is kept",
        "parameters": [isbn_param],
        "requestBody": book_input,
        "responses": {
            "200": respond("Updated book", &book),
            "400": respond("Invalid payload", &error),
            "404": respond("Book not found", &error),
            "500": respond("Store failure", &error)
        }
    });
    let delete_book = json!({
        "summary": "Delete a book",
        "parameters": [isbn_param],
        "responses": {
            "200": respond("Deleted book", &book),
            "404": respond("Book not found", &error),
            "500": respond("Store failure", &error)
        }
    });
    let book_input_schema = json!({
        "type": "object",
        "required": ["isbn", "title", "author", "year", "category"],
        "properties": {
            "isbn": { "type": "string" },
            "title": { "type": "string" },
            "author": { "type": "string" },
            "year": { "type": "integer", "minimum": 1900 },
            "category": { "type": "string" }
        }
    });
    let book_schema = json!({
        "allOf": [
            { "$ref": "#/components/schemas/BookInput" },
            {
                "type": "object",
                "properties": {
                    "createdAt": { "type": "string", "format": "date-time" },
                    "updatedAt": { "type": "string", "format": "date-time" }
                }
            }
        ]
    });
    json!({
        "openapi": "3.0.0",
        "info": { "title": "Books API", "version": env!("CARGO_PKG_VERSION") },
        "servers": [{ "url": format!("http://localhost:{}", port) }],
        "paths": {
            "/books": list_books,
            "/books/search": search_books,
            "/books/sort": sort_books,
            "/books/{isbn}": { "get": get_book, "put": put_book, "delete": delete_book }
        },
        "components": {
            "schemas": {
                "BookInput": book_input_schema,
                "Book": book_schema,
                "Error": { "type": "object", "properties": { "error": { "type": "string" } } }
            }
        }
    })
}
