//! Bot Detector Server
//!
//! Classifies social-media accounts as bot or human with a decision tree
//! trained on tabular account features.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      BOT DETECTOR                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌─────────────────────┐  │
//! │  │  API      │──▶│  Predictor  │──▶│  Model Loader       │  │
//! │  │  (Axum)   │   │  (align)    │   │  (lazy training)    │  │
//! │  └─────┬─────┘   └─────────────┘   └──────────┬──────────┘  │
//! │        │          ┌─────────────┐             │             │
//! │        └─────────▶│  Trainer    │◀────────────┘             │
//! │                   └──────┬──────┘                           │
//! │                          ▼                                  │
//! │                   ┌─────────────┐                           │
//! │                   │ Model Store │  model/bot_detector.json  │
//! │                   └─────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod detector;
mod error;
mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;
use std::sync::Arc;

use detector::{FileModelStore, ModelLoader, ModelStore};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bot_detector=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = config::Config::from_env();

    tracing::info!("Bot Detector starting ({})...", config.environment);
    tracing::info!("Model path: {}", config.model_path.display());
    tracing::info!("Training data: {}", config.training_data_path.display());

    let store: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(&config.model_path));
    let loader = Arc::new(ModelLoader::new(
        store,
        &config.training_data_path,
        config.training_options(),
    ));

    // Load or train the model before taking traffic
    let warm = loader.clone();
    match tokio::task::spawn_blocking(move || warm.get_model()).await? {
        Ok(model) => tracing::info!(
            "Model {} ready ({} features)",
            model.model_id,
            model.feature_schema().len()
        ),
        Err(e) => tracing::warn!("Model not ready at startup: {}", e),
    }

    // Build application state
    let state = AppState { loader };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ModelLoader>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict", post(handlers::predict::predict))
        .route("/api/train", post(handlers::train::train))
        .route("/api/health", get(handlers::health::check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
