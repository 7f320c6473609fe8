use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use super::{Books, CreateBook, UpdateBook};
use crate::api::{failure, not_found, success};
use crate::handler::AppState;

pub async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<CreateBook>,
) -> Response {
    let books = Books::new(&state.db, state.relations);

    match books.create(payload).await {
        Ok(book) => success(book),
        Err(e) => {
            tracing::error!("Failed to create book: {}", e);
            failure(&e)
        }
    }
}

pub async fn list_books(State(state): State<AppState>) -> Response {
    let books = Books::new(&state.db, state.relations);

    match books.list().await {
        Ok(books) => success(books),
        Err(e) => {
            tracing::error!("Failed to list books: {}", e);
            failure(&e)
        }
    }
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let books = Books::new(&state.db, state.relations);

    match books.get(&id).await {
        Ok(Some(book)) => success(book),
        Ok(None) => not_found("Book not found"),
        Err(e) => {
            tracing::error!("Failed to get book: {}", e);
            failure(&e)
        }
    }
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBook>,
) -> Response {
    let books = Books::new(&state.db, state.relations);

    match books.update(&id, payload).await {
        Ok(()) => success("Updated book successfully"),
        Err(e) => {
            tracing::error!("Failed to update book: {}", e);
            failure(&e)
        }
    }
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let books = Books::new(&state.db, state.relations);

    match books.delete(&id).await {
        Ok(()) => success("Deleted book successfully"),
        Err(e) => {
            tracing::error!("Failed to delete book: {}", e);
            failure(&e)
        }
    }
}
