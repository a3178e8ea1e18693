//! Survey Worker Binary
//!
//! Runs the survey submission and survey key HTTP server.

use std::env;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use survey_worker::{create_router, AppState, FsStore, ObjectStore, WorkerConfig};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("SURVEY_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let store = FsStore::new(&config.bucket_dir);
    let port = config.port;

    info!(
        active_kid = %config.secrets.active().0,
        kids = ?config.secrets.kids(),
        callers = ?config.registry.identifiers(),
        bucket = %store.root().display(),
        port = port,
        "Starting survey worker"
    );

    let store: Arc<dyn ObjectStore> = Arc::new(store);
    let state = Arc::new(AppState::from_config(config, store));
    let app = create_router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Survey worker listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!(pending = state.tasks.len(), "Draining submissions");
    state.drain().await;
    info!("Survey worker stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
