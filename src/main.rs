//! Demo runner for the provider load balancer.
//!
//! Registers a set of in-process providers, dispatches a batch of requests
//! through the caller-side retry helper, prints the balancer status, and keeps
//! the health monitor running until a shutdown signal arrives.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use provider_balancer::config::{load_config, BalancerConfig};
use provider_balancer::lifecycle::signals::shutdown_signal;
use provider_balancer::observability::{logging, metrics};
use provider_balancer::resilience::retries::get_with_retry;
use provider_balancer::{BasicProvider, LoadBalancer};

#[derive(Parser)]
#[command(name = "provider-balancer")]
#[command(about = "Client-side load balancer demo", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of providers to register.
    #[arg(short, long, default_value_t = 4)]
    providers: usize,

    /// Number of requests to dispatch.
    #[arg(short, long, default_value_t = 10)]
    requests: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("provider-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let balancer = LoadBalancer::from_config(&config)?;

    for _ in 0..cli.providers {
        if let Err(e) = balancer.register(Arc::new(BasicProvider::new())) {
            tracing::error!(error = %e, "Stopping registration");
            break;
        }
    }

    for request in 0..cli.requests {
        match get_with_retry(&balancer, &config.retries).await {
            Ok(id) => tracing::info!(request, provider = %id, "Request served"),
            Err(e) => tracing::warn!(request, error = %e, "Request failed"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&balancer.status())?);

    shutdown_signal().await?;
    balancer.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
