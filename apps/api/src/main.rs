mod ai;
mod config;
mod db;
mod errors;
mod llm_client;
mod plants;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::plants::generators::FieldGenerators;
use crate::plants::store::SqlitePlantStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on an unparsable PORT)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Herbarium API v{}", env!("CARGO_PKG_VERSION"));
    config.warn_on_suspicious_key();

    // Initialize SQLite (schema is created on first start)
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(SqlitePlantStore::new(pool));

    // Initialize Gemini client; without a key every AI field falls back
    let llm: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => {
            let client: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(key.clone())?);
            info!("Gemini client initialized (model: {})", config.gemini_model);
            Some(client)
        }
        None => {
            warn!("GEMINI_API_KEY not set; AI-derived plant fields will be left empty");
            None
        }
    };
    let generators = FieldGenerators::new(llm, config.gemini_model.clone());

    // Build app state
    let state = AppState {
        store,
        generators,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
