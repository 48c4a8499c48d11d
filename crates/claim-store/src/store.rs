//! The Claim Store interface.
//!
//! A narrow, transactional interface over durable storage. The relayer talks
//! to this trait only — any backend that satisfies it (Postgres, an
//! in-memory map for tests, anything else) is acceptable. All mutating
//! operations are atomic at single-record granularity; no enclosing
//! transaction is required across a batch.

use async_trait::async_trait;
use merkle_core::DistributionArtifact;

use crate::error::Result;
use crate::record::ClaimRecord;

#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Inserts one `ClaimRecord` in state `pending` per proof in `artifact`.
    /// Idempotent against `(distribution_id, index)` — re-seeding an already
    /// seeded distribution is a no-op for existing records.
    async fn seed_from_artifact(&self, artifact: &DistributionArtifact) -> Result<()>;

    /// Claims with state in `{pending, failed}` and `attempts < max_attempts`,
    /// ordered by `index`.
    async fn next_pending(
        &self,
        distribution_id: [u8; 32],
        max_attempts: u32,
    ) -> Result<Vec<ClaimRecord>>;

    /// Transitions to `submitted`, incrementing `attempts` and setting
    /// `last_attempt_at`. Called before broadcast so a crash after broadcast
    /// does not repeat the work silently.
    async fn mark_submitted(&self, distribution_id: [u8; 32], index: u64) -> Result<()>;

    /// Transitions to `confirmed` (terminal), recording `tx_reference` and
    /// `confirmed_at`. Never transitions out of `confirmed` again.
    async fn mark_confirmed(
        &self,
        distribution_id: [u8; 32],
        index: u64,
        tx_reference: &str,
    ) -> Result<()>;

    /// Transitions to `failed`, recording `last_error_message`. Does not
    /// increment `attempts` itself — the preceding `mark_submitted` for this
    /// same attempt already did: one increment per main-loop pass that
    /// reaches `mark_submitted`, not per terminal outcome. A later
    /// `next_pending` call will reconsider the claim while
    /// `attempts < max_attempts`.
    async fn mark_failed(
        &self,
        distribution_id: [u8; 32],
        index: u64,
        error_message: &str,
    ) -> Result<()>;

    /// Count of claims not yet `confirmed`, for the distribution's coarse
    /// `active -> completed` transition.
    async fn count_unconfirmed(&self, distribution_id: [u8; 32]) -> Result<u64>;
}
