use crate::extractor::Extractor;
use crate::utils::config::AppSettings;
use crate::utils::paths::DownloadsDir;
use anyhow::{Context, Result};
use axum::{
    http::{HeaderName, HeaderValue},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Semaphore;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;

pub mod errors;
pub mod routes;
pub mod schema;

pub use errors::{ApiError, ErrorBody};
pub use routes::FILE_NAME_HEADER;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<AppSettings>,
    /// Engine used for probe and fetch
    pub extractor: Arc<dyn Extractor>,
    /// Shared output directory, also swept by the janitor
    pub downloads: DownloadsDir,
    /// Admission control for concurrent engine calls
    pub engine_slots: Arc<Semaphore>,
}

impl AppContext {
    pub fn new(
        settings: AppSettings,
        extractor: Arc<dyn Extractor>,
        downloads: DownloadsDir,
    ) -> Self {
        let slots = settings.max_concurrent.max(1);
        Self {
            settings: Arc::new(settings),
            extractor,
            downloads,
            engine_slots: Arc::new(Semaphore::new(slots)),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = cors_layer(&ctx.settings);
    let static_dir = ctx.settings.static_dir.clone();

    Router::new()
        .route("/info", post(routes::link_info))
        .route("/download", post(routes::download_media))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn cors_layer(settings: &AppSettings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(FILE_NAME_HEADER)]);

    if settings.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Start the HTTP server
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.settings.host, ctx.settings.port)
        .parse()
        .context("Invalid server address")?;

    if !Path::new(&ctx.settings.static_dir).join("index.html").exists() {
        warn!(
            "No index.html in {:?}; the landing page will 404",
            ctx.settings.static_dir
        );
    }

    tracing::info!(
        "Starting server on {} (extractor: {})",
        addr,
        ctx.extractor.id()
    );

    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
