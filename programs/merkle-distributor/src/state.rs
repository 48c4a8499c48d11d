use anchor_lang::prelude::*;

/// One committed payout round (spec §3, `DistributionRecord` envelope fields
/// plus the root/proof-verification inputs from `DistributionArtifact`).
#[account]
pub struct Distribution {
    /// The 32-byte identifier this account's seeds are derived from.
    pub distribution_id: [u8; 32],
    pub merkle_root: [u8; 32],
    pub mint: Pubkey,
    /// Multisig authority that approved the initialize + fund transaction.
    pub authority: Pubkey,
    pub recipient_count: u64,
    pub total_amount: u64,
    /// Running count of confirmed claims, for cheap off-chain progress reads.
    pub claimed_count: u64,
    pub created_at: i64,
    /// Earliest unix timestamp at which `clawback` may be called.
    pub clawback_start_ts: i64,
    pub clawed_back: bool,
    pub bump: u8,
    pub vault_bump: u8,
}

impl Distribution {
    pub const LEN: usize = 8 // discriminator
        + 32 // distribution_id
        + 32 // merkle_root
        + 32 // mint
        + 32 // authority
        + 8  // recipient_count
        + 8  // total_amount
        + 8  // claimed_count
        + 8  // created_at
        + 8  // clawback_start_ts
        + 1  // clawed_back
        + 1  // bump
        + 1; // vault_bump
}

/// Existence of this account at `["claim", distribution, index_le]` is the
/// replay-prevention marker (spec §4.7, "Glossary: Uniqueness marker").
/// Account creation failing because the address is already occupied *is*
/// the `already_claimed` signal — the account carries no meaningful payload
/// beyond a timestamp for operator audit.
#[account]
pub struct ClaimMarker {
    pub claimed_at: i64,
}

impl ClaimMarker {
    pub const LEN: usize = 8 // discriminator
        + 8; // claimed_at
}
