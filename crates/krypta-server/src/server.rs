//! Server startup and lifecycle

use crate::config::Settings;
use crate::routes;
use crate::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the server until SIGINT/SIGTERM, then drain gracefully.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(settings).await?);
    let app = routes::create_router(Arc::clone(&state));

    let addr = state.settings.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "krypta server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
