use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::config::Config;
use screener::db::{create_pool, init_schema};
use screener::llm_client::LlmClient;
use screener::notify::HttpNotifier;
use screener::recorder::SqliteRecorder;
use screener::routes::build_router;
use screener::screening::pipeline::Services;
use screener::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and the shortlist schema
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    // Heavyweight service clients are built once here and reused for every
    // run; the pipeline only sees them as injected capabilities.
    let llm = Arc::new(LlmClient::new(
        config.llm_base_url.clone(),
        config.generation_model.clone(),
        config.embedding_model.clone(),
    ));
    info!(
        "LLM client initialized (generation: {}, embedding: {})",
        config.generation_model, config.embedding_model
    );

    let services = Services {
        generator: llm.clone(),
        embedder: llm,
        notifier: Arc::new(HttpNotifier::new(config.notifier_url.clone())),
        recorder: Arc::new(SqliteRecorder::new(db.clone())),
    };

    let state = AppState {
        db,
        config: config.clone(),
        services,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
