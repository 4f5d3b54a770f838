mod api;
mod config;
mod db;
mod entities;
mod error;
#[cfg(test)]
mod memory;
mod models;
mod routes;
mod service;
mod store;
mod templates;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};

use crate::{config::Config, service::MovieService, store::MovieStore, templates::Renderer};

/// Request bodies larger than this are rejected before decoding.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct AppState {
    pub movies: Arc<dyn MovieService>,
    pub renderer: Arc<Renderer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,moviedb=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = Arc::new(AppState {
        movies: Arc::new(MovieStore::new(db)),
        renderer: Arc::new(Renderer::new(config.site_title.clone())),
    });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, database = %config.database_url, "listening");
    axum::serve(listener, app(state)).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let json_api = Router::new()
        .route("/movies", get(api::list).post(api::create))
        .route("/movies/{id}", get(api::show).put(api::update).delete(api::delete));

    Router::new()
        .route("/", get(routes::home))
        .route("/movies", get(routes::index).post(routes::create))
        .route("/movies/new", get(routes::new_movie))
        .route("/movies/{id}", get(routes::show).post(routes::update))
        .route("/movies/{id}/edit", get(routes::edit))
        .route("/movies/{id}/delete", post(routes::delete))
        .nest("/api/v1", json_api)
        .fallback(routes::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
