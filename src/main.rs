use std::sync::Arc;

use anyhow::{Context, Result};
use coinvault::{
    build_router,
    config::AppConfig,
    db,
    repository::{CoinRepository, SqliteCoinRepository},
    state::AppState,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load application configuration")?;

    let pool = db::connect(&config)
        .await
        .with_context(|| format!("failed to open coin store at {}", config.database_url))?;

    let repository: Arc<dyn CoinRepository> = Arc::new(SqliteCoinRepository::new(pool));

    // Never serve against a schema that failed to migrate.
    repository
        .init()
        .await
        .context("failed to initialize coin schema")?;

    let app = build_router(AppState::new(repository));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "coin registry started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coinvault=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async { signalled_or_pending(tokio::signal::ctrl_c().await, "Ctrl+C").await };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => signalled_or_pending(Err(err), "SIGTERM").await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}

/// A handler that failed to install must never count as a received signal.
async fn signalled_or_pending(installed: std::io::Result<()>, signal: &str) {
    if let Err(err) = installed {
        error!(error = %err, signal, "unable to install signal handler");
        std::future::pending::<()>().await;
    }
}
