//! Learnhub - quiz grading, learner progress and performance reporting service

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learnhub_api::{ApiServer, ApiServerConfig};
use learnhub_core::{SeaOrmStore, Services};
use learnhub_directory::HttpUserDirectory;

/// Learnhub service
#[derive(Parser, Debug)]
#[command(name = "learnhub")]
#[command(about = "Run the Learnhub grading and progress service", long_about = None)]
#[command(version)]
struct Args {
    /// HTTP server bind address
    #[arg(long, env = "LEARNHUB_BIND_ADDR", default_value = "127.0.0.1:5003")]
    bind_addr: SocketAddr,

    /// Database URL (postgres://... or sqlite://...)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database_url: String,

    /// Base URL of the authentication service used for user lookups
    #[arg(
        long,
        env = "LEARNHUB_AUTH_SERVICE_URL",
        default_value = "http://127.0.0.1:5001"
    )]
    auth_service_url: String,

    /// Timeout in seconds for each authentication service request
    #[arg(long, env = "LEARNHUB_AUTH_TIMEOUT_SECS", default_value = "5")]
    auth_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable CORS
    #[arg(long)]
    no_cors: bool,

    /// Allowed CORS origin (repeatable)
    #[arg(long = "cors-origin", default_value = "http://localhost:5173")]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting Learnhub");
    info!("Authentication service: {}", args.auth_service_url);

    let db = learnhub_db::connect(&args.database_url)
        .await
        .with_context(|| format!("Failed to connect to database {}", args.database_url))?;
    learnhub_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    let directory = HttpUserDirectory::new(
        args.auth_service_url.clone(),
        Duration::from_secs(args.auth_timeout_secs),
    )
    .context("Failed to build authentication service client")?;

    let services = Services::new(Arc::new(SeaOrmStore::new(db)), Arc::new(directory));

    let config = ApiServerConfig {
        bind_addr: args.bind_addr,
        enable_cors: !args.no_cors,
        cors_origins: args.cors_origins,
    };

    ApiServer::new(config, services).start().await
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
