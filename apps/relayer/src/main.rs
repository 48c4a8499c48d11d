//! The untrusted off-chain Relayer binary.
//!
//! Reads a `DistributionArtifact`, resolves a Claim Store and chain client
//! from configuration, then drives claims to confirmation: one pass per
//! iteration, polling until the distribution is complete (or forever, for
//! an operator-supervised long-running process) unless `--single-pass` is
//! set.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use claim_store::{ClaimStore, InMemoryClaimStore, PgClaimStore};
use merkle_core::DistributionArtifact;
use merkle_relayer::{api, chain::SolanaRpcClient, config::Cli, metrics, ChainClient, Relayer};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics_handle = metrics::install();
    let health_addr: SocketAddr = cli.health_addr.parse()?;
    let api_state = api::ApiState { metrics: metrics_handle };
    tokio::spawn(async move {
        let router = api::router(api_state);
        match tokio::net::TcpListener::bind(health_addr).await {
            Ok(listener) => {
                if let Err(e) = axum::serve(listener, router).await {
                    error!(error = %e, "health/metrics server exited");
                }
            }
            Err(e) => error!(error = %e, %health_addr, "failed to bind health/metrics server"),
        }
    });

    let artifact_bytes = std::fs::read(&cli.artifact_path)?;
    let artifact: DistributionArtifact = serde_json::from_slice(&artifact_bytes)?;
    merkle_core::validate_artifact(&artifact, false)
        .map_err(|e| anyhow::anyhow!("artifact failed validation: {e}"))?;
    info!(
        distribution_id = %hex::encode(artifact.distribution_id),
        recipient_count = artifact.recipient_count,
        "loaded distribution artifact"
    );

    let config = cli.into_relayer_config()?;
    let chain: Arc<dyn ChainClient> = Arc::new(SolanaRpcClient::new(&config.rpc_endpoint));

    let store: Arc<dyn ClaimStore> = match &cli.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new().connect(url).await?;
            Arc::new(PgClaimStore::new(pool))
        }
        None => {
            warn!("no DATABASE_URL configured, using an in-memory claim store (not durable)");
            Arc::new(InMemoryClaimStore::new())
        }
    };

    let relayer = Relayer::new(config, chain, store.clone());

    loop {
        let summary = relayer.run_once(&artifact).await?;
        info!(
            confirmed = summary.confirmed_this_pass,
            failed = summary.failed_this_pass,
            reconciled = summary.reconciled_this_pass,
            complete = summary.distribution_completed,
            "relayer pass finished"
        );

        if summary.distribution_completed || cli.single_pass {
            break;
        }
        tokio::time::sleep(Duration::from_millis(cli.poll_interval_ms)).await;
    }

    Ok(())
}
