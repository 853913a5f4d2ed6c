//! catchlog-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use catchlog_gateway::api;
use catchlog_gateway::app_state::AppState;
use catchlog_gateway::config::{GatewayConfig, LogFormat, StoreBackend};
use catchlog_gateway::domain::EventBus;
use catchlog_gateway::identify::GeminiClient;
use catchlog_gateway::persistence::{
    CatchLogStore, FileStore, KeyValueStore, MemoryStore, PostgresStore,
};
use catchlog_gateway::service::{CatchService, spawn_session_sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting catchlog-gateway");

    // Build persistence layer
    let store = open_store(&config).await?;
    let log_store = CatchLogStore::new(store);

    // Build identification client
    let identifier = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .with_base_url(config.gemini_base_url.clone())
        .with_timeout(config.identify_timeout);
    tracing::info!(model = identifier.model(), "identification client ready");

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let catch_service = CatchService::load(
        Arc::new(identifier),
        log_store,
        event_bus,
        config.identify_timeout,
    )
    .await;

    let state = AppState::new(catch_service);
    let _sweeper = spawn_session_sweeper(Arc::clone(&state.catch_service), config.session_idle_timeout);
    tracing::info!(idle_secs = config.session_idle_timeout.as_secs(), "session sweeper started");

    // Build router
    let app = api::build_app(state, config.max_upload_bytes);

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
        )
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn open_store(config: &GatewayConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::File => {
            let store = FileStore::new(config.store_dir.clone());
            tracing::info!(dir = %store.dir().display(), "using file store");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; the catch log will not survive a restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            tracing::info!("using postgres store");
            let store =
                PostgresStore::connect(&config.database_url, config.database_max_connections)
                    .await
                    .context("failed to connect to postgres")?;
            Arc::new(store)
        }
    };
    Ok(store)
}
