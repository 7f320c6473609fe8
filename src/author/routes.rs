use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_author))
        .route("/", get(handler::list_authors))
        .route("/:id", get(handler::get_author))
        .route("/:id", put(handler::update_author))
        .route("/:id", delete(handler::delete_author))
}
