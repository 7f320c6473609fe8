use std::sync::Arc;

use axum::{Json, response::IntoResponse};
use tracing::info;

use crate::config::Relations;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub relations: Relations,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(serde_json::json!({ "status": "ok" }))
}
