//! Error taxonomy for the relayer.
//!
//! `ProofInvalid`, `Overflow`, and `ArtifactInvalid` are terminal and stop
//! the run; `TransportFailure`/`Expired` are retried subject to
//! `max_attempts`; `AlreadyClaimed` is never surfaced as an error — it is a
//! normal reconciliation outcome handled inline in [`crate::relayer`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayerError {
    #[error("artifact invalid: {0}")]
    ArtifactInvalid(#[from] merkle_core::CoreError),

    #[error("claim store error: {0}")]
    Store(#[from] claim_store::StoreError),

    #[error("transient RPC/network failure: {0}")]
    TransportFailure(String),

    #[error("recent-blockhash window expired mid-submission")]
    Expired,

    #[error("vault has insufficient funds for this distribution")]
    InsufficientFunds,

    #[error("on-chain proof verification rejected the claim")]
    ProofInvalid,

    #[error("distribution account not yet initialized on-chain")]
    DistributionNotInitialized,
}

pub type Result<T> = std::result::Result<T, RelayerError>;
