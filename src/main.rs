use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use survey_api::config::{self, Environment};
use survey_api::database::{DatabaseManager, PgStore};
use survey_api::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "survey-api", version, about = "Survey hosting API server")]
struct Args {
    /// Port to listen on (overrides SURVEY_API_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Apply database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

/// Waits for SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown..."),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survey_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    info!("Starting Survey API in {:?} mode", config.environment);

    let (state, pool) = if config.database.url.is_some() {
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::migrate(&pool).await?;
        if args.migrate_only {
            DatabaseManager::close(&pool).await;
            return Ok(());
        }
        (AppState::postgres(config.clone(), PgStore::new(pool.clone())), Some(pool))
    } else {
        if args.migrate_only {
            anyhow::bail!("--migrate-only requires DATABASE_URL");
        }
        if config.environment == Environment::Production {
            warn!("DATABASE_URL is not set; surveys will not survive a restart");
        } else {
            info!("DATABASE_URL is not set; using the in-memory store");
        }
        (AppState::in_memory(config.clone()).0, None)
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Survey API listening on http://{}", bind_addr);

    axum::serve(listener, survey_api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        DatabaseManager::close(&pool).await;
    }
    info!("Server shutdown complete");
    Ok(())
}
