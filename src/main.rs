use std::io::ErrorKind;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use vocab_quiz_backend::config::Config;
use vocab_quiz_backend::logging;
use vocab_quiz_backend::state::AppState;
use vocab_quiz_backend::store::snapshot::SnapshotFiles;
use vocab_quiz_backend::store::WordStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let (store, snapshot) = if config.persist {
        let files = SnapshotFiles::new(&config.data_dir);
        let store = files.load().await;
        (store, Some(files))
    } else {
        tracing::info!("persistence disabled, using in-memory store");
        (WordStore::new(), None)
    };

    let word_count = store.len();
    let stats_count = store.snapshot().iter().filter(|w| w.total() > 0).count();
    let state = AppState::new(store, snapshot).with_environment(&config.environment);
    let app = vocab_quiz_backend::build_app(state);

    let listener = match bind(&config).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, "failed to bind listener");
            return;
        }
    };
    let addr = listener
        .local_addr()
        .unwrap_or_else(|_| config.bind_addr());

    tracing::info!(
        %addr,
        words = word_count,
        stats = stats_count,
        environment = %config.environment,
        "vocab-quiz-backend listening"
    );

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

async fn bind(config: &Config) -> std::io::Result<TcpListener> {
    match TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == ErrorKind::AddrInUse && config.fallback_port != config.port => {
            tracing::warn!(
                port = config.port,
                fallback = config.fallback_port,
                "port in use, trying fallback port"
            );
            TcpListener::bind(config.fallback_addr()).await
        }
        Err(err) => Err(err),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
