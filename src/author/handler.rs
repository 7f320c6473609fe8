use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use super::{Authors, CreateAuthor, UpdateAuthor};
use crate::api::{failure, not_found, success};
use crate::handler::AppState;

pub async fn create_author(
    State(state): State<AppState>,
    Json(payload): Json<CreateAuthor>,
) -> Response {
    let authors = Authors::new(&state.db, state.relations);

    match authors.create(payload).await {
        Ok(author) => success(author),
        Err(e) => {
            tracing::error!("Failed to create author: {}", e);
            failure(&e)
        }
    }
}

pub async fn list_authors(State(state): State<AppState>) -> Response {
    let authors = Authors::new(&state.db, state.relations);

    match authors.list().await {
        Ok(authors) => success(authors),
        Err(e) => {
            tracing::error!("Failed to list authors: {}", e);
            failure(&e)
        }
    }
}

pub async fn get_author(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let authors = Authors::new(&state.db, state.relations);

    match authors.get(&id).await {
        Ok(Some(author)) => success(author),
        Ok(None) => not_found("Author not found"),
        Err(e) => {
            tracing::error!("Failed to get author: {}", e);
            failure(&e)
        }
    }
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAuthor>,
) -> Response {
    let authors = Authors::new(&state.db, state.relations);

    match authors.update(&id, payload).await {
        Ok(()) => success("Updated author successfully"),
        Err(e) => {
            tracing::error!("Failed to update author: {}", e);
            failure(&e)
        }
    }
}

pub async fn delete_author(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let authors = Authors::new(&state.db, state.relations);

    match authors.delete(&id).await {
        Ok(()) => success("Deleted author successfully"),
        Err(e) => {
            tracing::error!("Failed to delete author: {}", e);
            failure(&e)
        }
    }
}
