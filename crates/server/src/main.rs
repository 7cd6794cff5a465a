//! "Did you mean" REST API Server
//!
//! Loads the data directory once at startup and serves
//! `GET /api/search_issues` to issue forms.

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use didyoumean::search::SearchEngine;

#[derive(Parser, Debug)]
#[command(name = "didyoumean-server")]
#[command(about = "REST API server for \"did you mean\" issue search")]
struct Args {
    /// Data directory holding config.toml and data/snapshot.json
    #[arg(long, env = "DIDYOUMEAN_DATA_DIR", default_value = ".didyoumean")]
    data_dir: PathBuf,

    /// Address to listen on
    #[arg(long, env = "DIDYOUMEAN_BIND", default_value = "0.0.0.0:3000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    info!("Starting did-you-mean API server...");

    let engine = SearchEngine::open(&args.data_dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to initialize search engine: {}\n\n\
             The server requires a populated data directory.\n\
             Set DIDYOUMEAN_DATA_DIR or --data-dir to a directory containing data/snapshot.json.",
            e
        )
    })?;
    info!("Using data directory at: {}", args.data_dir.display());

    // Build CORS layer for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", didyoumean_server::create_routes(Arc::new(engine)))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Server listening on http://{}", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
