//! Application startup and lifecycle management.
//!
//! Wires the configured collaborators into an [`AssetOrchestrator`] and serves
//! the asset endpoint next to the health and metrics probes.

use crate::config::{AssetConfig, StorageBackend};
use crate::handlers;
use crate::services::{
    AssetDb, AssetOrchestrator, AzureBlobStorage, HttpImageFetcher, ImageFetcher, ImageGenerator,
    LocalStorage, MockImageFetcher, MockImageGenerator, OpenAiConfig, OpenAiImageGenerator,
    Storage,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AssetOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: AssetOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Builds the HTTP router. `/api/dalleAsset` is kept as an alias of `/assets`
/// for existing clients.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/assets",
            post(handlers::create_assets).delete(handlers::delete_asset),
        )
        .route(
            "/api/dalleAsset",
            post(handlers::create_assets).delete(handlers::delete_asset),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: AssetDb,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AssetConfig) -> Result<Self, AppError> {
        // Connect to database
        let db = AssetDb::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            &config.mongodb.collection,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            e
        })?;

        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
        })?;

        let storage = build_storage(&config, http_client.clone()).await?;
        let (generator, fetcher) = build_providers(&config, http_client);

        let orchestrator = AssetOrchestrator::new(generator, fetcher, storage, Arc::new(db.clone()))
            .with_step_timeout(config.orchestrator.step_timeout());

        if let Some(limit) = config.orchestrator.step_timeout() {
            tracing::info!(timeout = ?limit, "Collaborator calls are time-bounded");
        }

        let mut router = build_router(AppState::new(orchestrator));
        if config.storage.backend == StorageBackend::Local {
            router = router.nest_service("/static", ServeDir::new(&config.storage.local_path));
        }

        // Bind HTTP listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Asset service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    pub fn db(&self) -> &AssetDb {
        &self.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}

async fn build_storage(
    config: &AssetConfig,
    http_client: reqwest::Client,
) -> Result<Arc<dyn Storage>, AppError> {
    match config.storage.backend {
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                &config.storage.local_path,
                config.storage.public_base_url.clone(),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to initialize local storage at {}: {}",
                    config.storage.local_path,
                    e
                );
                e
            })?;
            tracing::info!(path = %config.storage.local_path, "Using local storage backend");
            Ok(Arc::new(storage))
        }
        StorageBackend::Azure => {
            let connection_string = config
                .storage
                .connection_string
                .as_deref()
                .ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "AZURE_STORAGE_CONNECTION_STRING is not set"
                    ))
                })?;
            let storage = AzureBlobStorage::from_connection_string(
                http_client,
                connection_string,
                config.storage.container.clone(),
            )?;
            tracing::info!(container = %config.storage.container, "Using Azure blob storage backend");
            Ok(Arc::new(storage))
        }
    }
}

fn build_providers(
    config: &AssetConfig,
    http_client: reqwest::Client,
) -> (Arc<dyn ImageGenerator>, Arc<dyn ImageFetcher>) {
    match (config.openai.enabled, config.openai.api_key.clone()) {
        (true, Some(api_key)) => {
            let openai_config = OpenAiConfig {
                api_key,
                model: config.openai.model.clone(),
                api_base: config.openai.api_base.clone(),
            };
            tracing::info!(model = %config.openai.model, "Initialized OpenAI image provider");
            let generator: Arc<dyn ImageGenerator> =
                Arc::new(OpenAiImageGenerator::new(openai_config, http_client.clone()));
            let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpImageFetcher::new(http_client));
            (generator, fetcher)
        }
        _ => {
            tracing::info!("OpenAI provider disabled, using mock image provider");
            let generator: Arc<dyn ImageGenerator> = Arc::new(MockImageGenerator::new());
            let fetcher: Arc<dyn ImageFetcher> = Arc::new(MockImageFetcher::new());
            (generator, fetcher)
        }
    }
}
