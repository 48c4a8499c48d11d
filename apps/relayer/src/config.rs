//! Relayer configuration.
//!
//! Built once at process entry from `clap` args merged with environment
//! variables (`dotenvy`), then passed down explicitly — no ambient globals.

use std::path::PathBuf;

use clap::Parser;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair};

#[derive(Debug, Parser)]
#[command(name = "merkle-relayer")]
#[command(about = "Drives Merkle distribution claims to confirmation", version)]
pub struct Cli {
    /// Chain RPC endpoint.
    #[arg(long, env = "RPC_ENDPOINT")]
    pub rpc_endpoint: String,

    /// Path to the fee payer's keypair file (64-byte secret, JSON array form).
    #[arg(long, env = "PAYER_KEYPAIR_PATH")]
    pub payer_keypair_path: PathBuf,

    /// Merkle Distributor program id.
    #[arg(long, env = "PROGRAM_ID")]
    pub program_id: Pubkey,

    /// Path to the `DistributionArtifact` this run claims against.
    #[arg(long, env = "ARTIFACT_PATH")]
    pub artifact_path: PathBuf,

    /// Claims per transaction (small integer, bounded by tx-size limits).
    #[arg(long, env = "BATCH_SIZE", default_value_t = 3)]
    pub batch_size: usize,

    /// Per-claim attempt ceiling before a claim is surfaced to the operator.
    #[arg(long, env = "MAX_ATTEMPTS", default_value_t = 5)]
    pub max_attempts: u32,

    /// Delay between transaction-level retries.
    #[arg(long, env = "RETRY_DELAY_MS", default_value_t = 1_500)]
    pub retry_delay_ms: u64,

    /// Polite delay between batches.
    #[arg(long, env = "BATCH_DELAY_MS", default_value_t = 250)]
    pub batch_delay_ms: u64,

    /// Compute-unit limit prepended to every claim transaction.
    #[arg(long, env = "COMPUTE_UNIT_LIMIT", default_value_t = 200_000)]
    pub compute_unit_limit: u32,

    /// Compute-unit price (micro-lamports); 0 disables the priority fee.
    #[arg(long, env = "COMPUTE_UNIT_PRICE_MICRO", default_value_t = 0)]
    pub compute_unit_price_micro: u64,

    /// Transaction-level retries per submitted batch before `mark_failed`.
    #[arg(long, env = "MAX_SUBMIT_RETRIES", default_value_t = 3)]
    pub max_submit_retries: u32,

    /// `DATABASE_URL` for the Postgres-backed claim store; omitted uses an
    /// in-memory store (single-run / test use only).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Host:port the health/metrics server binds to.
    #[arg(long, env = "HEALTH_ADDR", default_value = "0.0.0.0:8085")]
    pub health_addr: String,

    /// Delay between main-loop passes while the distribution still has
    /// unconfirmed claims — a polling cadence distinct from
    /// `retry_delay_ms`/`batch_delay_ms`, which govern sub-pass pacing.
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 5_000)]
    pub poll_interval_ms: u64,

    /// Run exactly one pass and exit instead of looping until the
    /// distribution completes. Used by `apps/cli`'s `relay-once` command.
    #[arg(long, env = "SINGLE_PASS", default_value_t = false)]
    pub single_pass: bool,
}

/// The resolved, immutable configuration passed down to the relayer loop.
/// Distinct from [`Cli`] so the payer keypair is parsed once, not re-read.
pub struct RelayerConfig {
    pub rpc_endpoint: String,
    pub payer: Keypair,
    pub program_id: Pubkey,
    pub batch_size: usize,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub batch_delay_ms: u64,
    pub compute_unit_limit: u32,
    pub compute_unit_price_micro: u64,
    pub max_submit_retries: u32,
}

impl Cli {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Cli::parse())
    }

    pub fn into_relayer_config(&self) -> anyhow::Result<RelayerConfig> {
        let payer = read_keypair_file(&self.payer_keypair_path)
            .map_err(|e| anyhow::anyhow!("failed to read payer keypair: {e}"))?;
        Ok(RelayerConfig {
            rpc_endpoint: self.rpc_endpoint.clone(),
            payer,
            program_id: self.program_id,
            batch_size: self.batch_size.max(1),
            max_attempts: self.max_attempts,
            retry_delay_ms: self.retry_delay_ms,
            batch_delay_ms: self.batch_delay_ms,
            compute_unit_limit: self.compute_unit_limit,
            compute_unit_price_micro: self.compute_unit_price_micro,
            max_submit_retries: self.max_submit_retries.max(1),
        })
    }
}
