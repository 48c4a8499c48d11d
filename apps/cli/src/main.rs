//! Thin operator CLI over `merkle-core` / `merkle-relayer`'s library
//! surface: a driver, not a feature in its own right.

mod payout;

use std::path::PathBuf;
use std::sync::Arc;

use claim_store::{ClaimStore, InMemoryClaimStore, PgClaimStore};
use clap::{Parser, Subcommand};
use merkle_core::{build_artifact, validate_artifact, DistributionArtifact, DistributionIdentity};
use merkle_relayer::config::RelayerConfig;
use merkle_relayer::{chain::SolanaRpcClient, ChainClient, Relayer};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "merkle", about = "Merkle distribution engine operator CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a `DistributionArtifact` from a payout CSV (columns:
    /// index,recipient,amount).
    BuildArtifact(BuildArtifactArgs),
    /// Validate a `DistributionArtifact` read back from storage.
    ValidateArtifact(ValidateArtifactArgs),
    /// Run one relayer pass against an artifact and exit.
    RelayOnce(RelayOnceArgs),
}

#[derive(Parser)]
struct BuildArtifactArgs {
    /// Payout CSV path.
    #[arg(long)]
    csv_path: PathBuf,

    /// Reward identifier, part of the distribution-id identity tuple.
    #[arg(long)]
    reward_id: String,

    /// Window identifier, part of the distribution-id identity tuple.
    #[arg(long)]
    window_id: String,

    /// Token mint, part of the distribution-id identity tuple.
    #[arg(long)]
    mint: Pubkey,

    /// Output path for the built artifact (JSON).
    #[arg(long)]
    out_path: PathBuf,
}

#[derive(Parser)]
struct ValidateArtifactArgs {
    /// Artifact path to validate.
    #[arg(long)]
    artifact_path: PathBuf,

    /// Verify every proof rather than sampling one. Test contexts should
    /// verify all proofs; operator contexts may sample.
    #[arg(long, default_value_t = false)]
    full: bool,
}

#[derive(Parser)]
struct RelayOnceArgs {
    #[arg(long, env = "RPC_ENDPOINT")]
    rpc_endpoint: String,

    #[arg(long, env = "PAYER_KEYPAIR_PATH")]
    payer_keypair_path: PathBuf,

    #[arg(long, env = "PROGRAM_ID")]
    program_id: Pubkey,

    #[arg(long, env = "ARTIFACT_PATH")]
    artifact_path: PathBuf,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, default_value_t = 3)]
    batch_size: usize,

    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    #[arg(long, default_value_t = 1_500)]
    retry_delay_ms: u64,

    #[arg(long, default_value_t = 250)]
    batch_delay_ms: u64,

    #[arg(long, default_value_t = 200_000)]
    compute_unit_limit: u32,

    #[arg(long, default_value_t = 0)]
    compute_unit_price_micro: u64,

    #[arg(long, default_value_t = 3)]
    max_submit_retries: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::BuildArtifact(args) => build_artifact_cmd(args),
        Command::ValidateArtifact(args) => validate_artifact_cmd(args),
        Command::RelayOnce(args) => relay_once_cmd(args).await,
    }
}

fn build_artifact_cmd(args: BuildArtifactArgs) -> anyhow::Result<()> {
    let (entries, source_bytes) = payout::read_payout_csv(&args.csv_path)?;

    let artifact = build_artifact(
        DistributionIdentity {
            reward_id: &args.reward_id,
            window_id: &args.window_id,
            mint: args.mint.to_bytes(),
        },
        &entries,
        &source_bytes,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| anyhow::anyhow!("failed to build artifact: {e}"))?;

    validate_artifact(&artifact, true).map_err(|e| anyhow::anyhow!("built artifact failed self-check: {e}"))?;

    let json = serde_json::to_vec_pretty(&artifact)?;
    std::fs::write(&args.out_path, json)?;

    println!(
        "built distribution {} : {} recipients, total_amount={}",
        hex::encode(artifact.distribution_id),
        artifact.recipient_count,
        artifact.total_amount
    );
    Ok(())
}

fn validate_artifact_cmd(args: ValidateArtifactArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.artifact_path)?;
    let artifact: DistributionArtifact = serde_json::from_slice(&bytes)?;
    validate_artifact(&artifact, args.full).map_err(|e| anyhow::anyhow!("artifact invalid: {e}"))?;
    println!(
        "artifact {} is valid ({} proofs checked)",
        hex::encode(artifact.distribution_id),
        if args.full { artifact.proofs.len() } else { 1 }
    );
    Ok(())
}

async fn relay_once_cmd(args: RelayOnceArgs) -> anyhow::Result<()> {
    let artifact_bytes = std::fs::read(&args.artifact_path)?;
    let artifact: DistributionArtifact = serde_json::from_slice(&artifact_bytes)?;
    validate_artifact(&artifact, false).map_err(|e| anyhow::anyhow!("artifact failed validation: {e}"))?;

    let payer = read_keypair_file(&args.payer_keypair_path)
        .map_err(|e| anyhow::anyhow!("failed to read payer keypair: {e}"))?;

    let config = RelayerConfig {
        rpc_endpoint: args.rpc_endpoint.clone(),
        payer,
        program_id: args.program_id,
        batch_size: args.batch_size.max(1),
        max_attempts: args.max_attempts,
        retry_delay_ms: args.retry_delay_ms,
        batch_delay_ms: args.batch_delay_ms,
        compute_unit_limit: args.compute_unit_limit,
        compute_unit_price_micro: args.compute_unit_price_micro,
        max_submit_retries: args.max_submit_retries.max(1),
    };

    let chain: Arc<dyn ChainClient> = Arc::new(SolanaRpcClient::new(&args.rpc_endpoint));
    let store: Arc<dyn ClaimStore> = match &args.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new().connect(url).await?;
            Arc::new(PgClaimStore::new(pool))
        }
        None => Arc::new(InMemoryClaimStore::new()),
    };

    let relayer = Relayer::new(config, chain, store);
    let summary = relayer.run_once(&artifact).await?;

    println!(
        "pass complete: confirmed={} failed={} reconciled={} distribution_completed={}",
        summary.confirmed_this_pass,
        summary.failed_this_pass,
        summary.reconciled_this_pass,
        summary.distribution_completed
    );
    Ok(())
}
