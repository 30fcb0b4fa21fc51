use crate::config::PluginConfig;
use crate::handlers;
use crate::services::{
    ArtifactCatalog, AuthEngine, DirectoryStore, EngineError, PackResolver, PermissionEvaluator,
};
use axum::{routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::security_headers_middleware;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: PluginConfig,
    pub catalog: Arc<ArtifactCatalog>,
    pub directory: Arc<DirectoryStore>,
    pub auth: AuthEngine,
    pub packs: Arc<PackResolver>,
    pub permissions: PermissionEvaluator,
}

impl AppState {
    /// Wire the engine components over the configured directories.
    pub async fn build(config: PluginConfig) -> Result<Self, AppError> {
        let catalog = Arc::new(ArtifactCatalog::new(
            &config.storage.plugins_dir,
            &config.storage.artifact_extension,
        ));

        let config_dir = Path::new(&config.storage.config_dir);
        let directory = match DirectoryStore::load(config_dir).await {
            Ok(store) => store,
            Err(EngineError::ConfigMissing(path)) => {
                tracing::warn!(path = %path, "Identity directory missing, starting empty");
                DirectoryStore::empty(config_dir)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load identity directory");
                return Err(e.into());
            }
        };
        let directory = Arc::new(directory);

        let packs = Arc::new(
            PackResolver::load(config_dir, catalog.clone())
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to load pack configuration");
                    AppError::from(e)
                })?,
        );

        let auth = AuthEngine::new(directory.clone());
        let permissions = PermissionEvaluator::new(packs.clone(), catalog.clone());

        Ok(AppState {
            config,
            catalog,
            directory,
            auth,
            packs,
            permissions,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/api/status", get(handlers::status))
        .route("/api/plugins", get(handlers::list_plugins))
        .route("/api/pack/:name", get(handlers::pack_info))
        .route("/api/get_plugin", get(handlers::get_plugin))
        .route("/api/user_info", get(handlers::user_info))
        .route("/api/user_plugins", get(handlers::user_plugins))
        .route("/api/company_stats", get(handlers::company_stats))
        .route("/api/machines/:email", get(handlers::machines))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: PluginConfig) -> Result<Self, AppError> {
        let port = config.common.port;
        let state = AppState::build(config).await?;
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
