//! Error definitions for the Merkle Distributor program.

use anchor_lang::prelude::*;

#[error_code]
pub enum DistributorError {
    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Distribution is already claimed at this index")]
    AlreadyClaimed,

    #[msg("Invalid merkle proof")]
    InvalidProof,

    #[msg("Index out of range for this distribution")]
    InvalidIndex,

    #[msg("Proof length exceeds the maximum supported tree depth")]
    InvalidProofLength,

    #[msg("recipient_count must be greater than zero")]
    EmptyDistribution,

    #[msg("Clawback window has not opened yet")]
    ClawbackNotYetEligible,

    #[msg("Distribution has already been clawed back")]
    AlreadyClawedBack,

    #[msg("Vault has insufficient funds for this claim")]
    InsufficientFunds,

    #[msg("Math overflow")]
    MathOverflow,
}
