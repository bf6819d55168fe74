//! Application assembly and server lifecycle

use crate::auth::AuthHandler;
use crate::config::HttpConfig;
use crate::errors::{HttpError, HttpResult};
use crate::routing::auth_router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router: the auth endpoint, a health check and the request layers
pub fn build_app(handler: AuthHandler, config: &HttpConfig) -> Router {
    let app = auth_router(handler)
        .route(&config.health_check_path, get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_request_size))
        .layer(TimeoutLayer::new(config.request_timeout()));

    if config.enable_tracing {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": latchkey_core::SERVICE_NAME,
        "version": latchkey_core::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Serve `app` on `addr` until Ctrl+C or SIGTERM
pub async fn serve(addr: &str, app: Router) -> HttpResult<()> {
    serve_with_shutdown(addr, app, shutdown_signal()).await
}

/// Serve `app` on `addr` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(addr: &str, app: Router, shutdown: F) -> HttpResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| HttpError::startup(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("HTTP server listening on {}", listener.local_addr()?);

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!("Server error: {}", e);
        return Err(HttpError::startup(format!("Server failed: {}", e)));
    }

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
