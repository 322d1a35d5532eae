use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tributary_remote::Remote;

use crate::handlers::{
    auth::{authorize, authorize_password},
    builds::trigger_build,
    health::health_check,
    pages::{show_index, show_login, show_login_form},
    repos::{activate_repo, deactivate_repo, get_repo, list_repos},
};
use crate::middleware::{LoggingLayer, RemoteLayer, RequestIdLayer};
use crate::state::AppState;

/// Creates the router, binding `remote` to every request.
pub fn create_router(state: AppState, remote: Arc<dyn Remote>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer)
        .layer(RemoteLayer::new(remote));

    let api = Router::new()
        .route("/user/repos", get(list_repos))
        .route(
            "/repos/{owner}/{name}",
            get(get_repo).post(activate_repo).delete(deactivate_repo),
        )
        .route("/repos/{owner}/{name}/builds", post(trigger_build));

    Router::new()
        .route("/health", get(health_check))
        // Pages
        .route("/", get(show_index))
        .route("/login", get(show_login))
        .route("/login/form", get(show_login_form))
        .route("/authorize", get(authorize).post(authorize_password))
        .nest("/api", api)
        .with_state(state)
        .layer(middleware_stack)
}

/// Serves the router on `addr` until a shutdown signal arrives.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    remote: Arc<dyn Remote>,
) -> Result<(), std::io::Error> {
    let app = create_router(state, remote);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
