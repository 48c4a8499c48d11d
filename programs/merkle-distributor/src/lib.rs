//! On-chain Verifier Contract for the Merkle distribution engine (spec §4.7).
//!
//! Two instructions: `initialize` allocates the distribution + vault PDAs
//! and commits the merkle root; `claim` reconstructs a leaf from
//! `(distribution_id, recipient, amount)`, folds the supplied proof against
//! the stored root via [`merkle_core::verify_proof`], and pays out once —
//! a second claim at the same index can never allocate the same uniqueness
//! marker PDA. Both the leaf encoding and the proof fold are shared with the
//! off-chain builder/relayer through the `merkle-core` crate, so the two
//! sides cannot drift by a single byte.

use anchor_lang::prelude::*;

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("MerkDist1111111111111111111111111111111111");

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name: "Merkle Distribution Engine",
    project_url: "https://github.com/example/merkle-distribution-engine",
    contacts: "email:security@example.com",
    policy: "https://github.com/example/merkle-distribution-engine/blob/main/SECURITY.md",
    preferred_languages: "en",
    source_code: "https://github.com/example/merkle-distribution-engine"
}

#[program]
pub mod merkle_distributor {
    use super::*;

    /// Allocates the distribution and vault PDAs and commits the merkle
    /// root. Callable by whoever signs — in production that is the
    /// multisig authority's executed "initialize + fund" transaction.
    pub fn initialize(
        ctx: Context<Initialize>,
        distribution_id: [u8; 32],
        merkle_root: [u8; 32],
        total_amount: u64,
        recipient_count: u64,
        clawback_start_ts: i64,
    ) -> Result<()> {
        instructions::initialize::initialize(
            ctx,
            distribution_id,
            merkle_root,
            total_amount,
            recipient_count,
            clawback_start_ts,
        )
    }

    /// Verifies `proof` against the stored root for `(recipient, amount)`
    /// at `index`, creates the uniqueness marker, and transfers `amount`
    /// from the vault to the recipient's token account.
    pub fn claim(
        ctx: Context<Claim>,
        index: u64,
        amount: u64,
        proof: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::claim::claim(ctx, index, amount, proof)
    }

    /// Sweeps any remaining vault balance back to the authority once the
    /// clawback window has opened, and closes the distribution account.
    pub fn clawback(ctx: Context<Clawback>) -> Result<()> {
        instructions::clawback::clawback(ctx)
    }
}
