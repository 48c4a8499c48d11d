//! Events emitted for off-chain indexing and observability, matching the
//! teacher's convention of emitting one event per state-changing instruction.

use anchor_lang::prelude::*;

#[event]
pub struct DistributionInitialized {
    pub distribution_id: [u8; 32],
    pub distribution: Pubkey,
    pub merkle_root: [u8; 32],
    pub mint: Pubkey,
    pub recipient_count: u64,
    pub total_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct Claimed {
    pub distribution_id: [u8; 32],
    pub index: u64,
    pub recipient: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct ClawedBack {
    pub distribution_id: [u8; 32],
    pub amount: u64,
    pub clawback_receiver: Pubkey,
    pub timestamp: i64,
}
