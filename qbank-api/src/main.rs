//! qbank-api - Question bank REST gateway
//!
//! Serves the admin content-tree CRUD, catalog and account management, the
//! doctor explanation/voice endpoints, and JWT login over a SQLite store.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use qbank_api::services::{HttpExplanationClient, HttpSpeechClient};
use qbank_api::{build_router, AppState};
use qbank_common::config;
use qbank_common::db::init_database;

#[derive(Parser, Debug)]
#[command(name = "qbank-api", about = "Question bank REST gateway")]
struct Args {
    /// Root data folder (overrides QBANK_ROOT and the config file)
    #[arg(long)]
    root: Option<String>,

    /// Listen address
    #[arg(long, env = "QBANK_BIND", default_value = "127.0.0.1:5730")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting QBank API v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root.as_deref());
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let service_config = config::load_service_config()?;

    let pool = init_database(&db_path).await?;
    info!("✓ Database ready");

    let speech = Arc::new(HttpSpeechClient::new(&service_config.speech_base_url)?);
    let explainer = Arc::new(HttpExplanationClient::new(
        &service_config.explanation_base_url,
    )?);

    let state = AppState::new(pool, service_config.jwt_secret, speech, explainer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("qbank-api listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
