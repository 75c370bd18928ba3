//! Depth-guarded GraphQL endpoint binary.
//!
//! Run with: `graphql-depth-guard --config config.yaml`
//!
//! Accepted requests are forwarded to the execution engine at `upstream.url`.

use anyhow::{Context, Result};
use clap::Parser;
use graphql_depth_guard::{server, GraphQLService, GraphQLServiceConfig, UpstreamExecutor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// GraphQL endpoint that rejects over-nested operations before execution.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Address to listen on, overriding the configuration file
    #[arg(long)]
    listen_address: Option<String>,

    /// GraphQL execution engine URL, overriding the configuration file
    #[arg(long)]
    upstream_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!(
        "Starting GraphQL depth guard v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Config file: {}", args.config.display());

    let mut config = if args.config.exists() {
        let content = tokio::fs::read_to_string(&args.config)
            .await
            .context("Failed to read config file")?;
        GraphQLServiceConfig::from_yaml(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        GraphQLServiceConfig::default()
    };

    if let Some(listen_address) = args.listen_address {
        config.settings.listen_address = listen_address;
    }
    if let Some(upstream_url) = args.upstream_url {
        config.upstream.url = upstream_url;
    }
    config.validate().context("Invalid configuration")?;

    let executor =
        UpstreamExecutor::new(&config.upstream).context("Failed to create upstream client")?;
    info!("Upstream execution engine: {}", executor.url());

    let addr = config.settings.listen_addr()?;
    let service = Arc::new(GraphQLService::new(
        config.settings.clone(),
        Arc::new(executor),
    ));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install CTRL+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    server::serve(listener, server::router(service), shutdown)
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}
