use std::sync::Arc;

use athenaeum::author;
use athenaeum::book;
use athenaeum::config::{Cli, Config, default_config_path};
use athenaeum::db::Database;
use athenaeum::handler::{AppState, healthcheck};
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::{Router, routing::get};
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    let config_path = match args.config_path {
        Some(path) => std::path::PathBuf::from(path),
        None => default_config_path(),
    };

    tracing_subscriber::fmt().json().init();
    tracing::info!("athenaeum.svc starting");

    let cfg = Config::new(config_path.to_str().unwrap()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let db = Arc::new(Database::new(&cfg).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let address = format!("0.0.0.0:{}", cfg.app.get_port());

    // Both resources answer under a singular and a plural prefix.
    let app = Router::new()
        .route("/", get(healthcheck))
        .nest("/v1/author", author::routes())
        .nest("/v1/authors", author::routes())
        .nest("/v1/book", book::routes())
        .nest("/v1/books", book::routes())
        .layer(DefaultBodyLimit::max(cfg.app.get_body_limit_bytes()))
        .layer(cors)
        .with_state(AppState {
            db,
            relations: cfg.relations,
        });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("athenaeum.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server exited with error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
        }
    }

    tracing::info!("athenaeum.svc going off, graceful shutdown complete");
}
