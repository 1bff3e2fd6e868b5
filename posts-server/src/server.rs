use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::post_service::PostService;
use crate::infrastructure::database::StorageHandle;
use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::body_limit::apply_body_limit;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

pub(crate) async fn run_http(settings: &Settings, storage: &StorageHandle) -> Result<()> {
    let app = build_app(settings, storage)?;
    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

/// The full application router: routes, OpenAPI UI, and middleware, wired
/// to the given storage handle.
pub fn build_app(settings: &Settings, storage: &StorageHandle) -> Result<Router> {
    let service = PostService::new(
        storage.repository(),
        settings.id_strategy,
        settings.upsert_on_update,
    );
    let state = AppState::new(Arc::new(service));

    let app = build_router(state);
    let app = apply_body_limit(app, settings);
    let app = apply_trace(app);
    apply_cors(app, settings)
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
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
    info!("shutdown signal received, draining connections");
}
