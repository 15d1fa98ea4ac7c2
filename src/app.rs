//! Application wiring: shared state, router assembly and the server loop.

use std::time::Duration;

use axum::http::Request;
use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::resources::{self, Colleges, OrgMembers, Organizations, Programs, Students};
use crate::{dashboard, health};

/// Shared state cloned into every handler.
#[derive(Clone)]
pub struct AppContext {
    pub db: DatabaseConnection,
}

impl AppContext {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// Build the full application router with middleware applied.
pub fn router(context: AppContext) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .route("/health", get(health::health_handler))
        .merge(resources::routes::<Colleges>())
        .merge(resources::routes::<Programs>())
        .merge(resources::routes::<Students>())
        .merge(resources::routes::<Organizations>())
        .merge(resources::routes::<OrgMembers>())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

/// The configured application, ready to serve.
pub struct App {
    config: Config,
    context: AppContext,
}

impl App {
    pub fn new(config: Config, context: AppContext) -> Self {
        Self { config, context }
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, router(self.context))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // give in-flight requests a moment to drain
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}
