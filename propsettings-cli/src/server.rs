//! Web Server for PropSettings
//!
//! Serves the properties REST resource and the built web UI.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use propsettings_shared::RoleInfo;

use crate::api;
use crate::registry::PropertyRegistry;

/// Server state shared across all handlers
pub struct AppState {
    pub registry: RwLock<PropertyRegistry>,
    /// Role reported to the UI and required for saving
    pub role: RoleInfo,
}

impl AppState {
    pub fn new(registry: PropertyRegistry, role: RoleInfo) -> Self {
        Self {
            registry: RwLock::new(registry),
            role,
        }
    }
}

/// Build the application router
///
/// When `ui_dir` is set, its files are served for every unmatched path and
/// `index.html` is returned for client-side routes.
pub fn build_router(state: Arc<AppState>, ui_dir: Option<&Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(api::create_api_router());

    if let Some(dir) = ui_dir {
        let index = dir.join("index.html");
        if !index.exists() {
            warn!("UI directory {} has no index.html", dir.display());
        }
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start_server(
    port: u16,
    state: Arc<AppState>,
    ui_dir: Option<PathBuf>,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    let app = build_router(state, ui_dir.as_deref());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on {}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))
    });

    Ok(handle)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
