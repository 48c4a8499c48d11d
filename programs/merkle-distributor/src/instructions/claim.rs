use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};
use merkle_core::{leaf_hash, verify_proof};

use crate::constants::{CLAIM_MARKER_SEED, DISTRIBUTION_SEED, MAX_PROOF_LEN, VAULT_SEED};
use crate::errors::DistributorError;
use crate::events::Claimed;
use crate::state::{ClaimMarker, Distribution};

/// Pays out one leaf of a committed distribution (spec §4.7, `claim`).
///
/// `claim_marker` is `init`: its address is the uniqueness marker derived
/// from `(distribution, index)`, so Anchor's own "account already in use"
/// failure on `init` is the on-chain replay guard — a second claim at the
/// same index can never allocate the same PDA twice.
#[derive(Accounts)]
#[instruction(index: u64)]
pub struct Claim<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: not a signer. The merkle leaf binds `recipient`, so a proof
    /// that verifies against the stored root is the only authorization this
    /// instruction needs — the relayer submits on recipients' behalf.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [DISTRIBUTION_SEED, distribution.distribution_id.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Account<'info, Distribution>,

    #[account(
        init,
        payer = payer,
        space = ClaimMarker::LEN,
        seeds = [CLAIM_MARKER_SEED, distribution.key().as_ref(), &index.to_le_bytes()],
        bump,
    )]
    pub claim_marker: Account<'info, ClaimMarker>,

    #[account(
        mut,
        seeds = [VAULT_SEED, distribution.distribution_id.as_ref()],
        bump = distribution.vault_bump,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    #[account(address = distribution.mint)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = mint,
        associated_token::authority = recipient,
        associated_token::token_program = token_program,
    )]
    pub recipient_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, anchor_spl::associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn claim(
    ctx: Context<Claim>,
    index: u64,
    amount: u64,
    proof: Vec<[u8; 32]>,
) -> Result<()> {
    require!(
        proof.len() <= MAX_PROOF_LEN,
        DistributorError::InvalidProofLength
    );
    require!(
        index < ctx.accounts.distribution.recipient_count,
        DistributorError::InvalidIndex
    );

    let distribution = &ctx.accounts.distribution;
    let leaf = leaf_hash(
        &distribution.distribution_id,
        &ctx.accounts.recipient.key().to_bytes(),
        amount,
    );
    require!(
        verify_proof(leaf, &proof, distribution.merkle_root),
        DistributorError::InvalidProof
    );
    require!(
        ctx.accounts.vault.amount >= amount,
        DistributorError::InsufficientFunds
    );

    ctx.accounts.claim_marker.claimed_at = Clock::get()?.unix_timestamp;

    let distribution_id = distribution.distribution_id;
    let signer_seeds: &[&[u8]] = &[
        DISTRIBUTION_SEED,
        distribution_id.as_ref(),
        &[distribution.bump],
    ];

    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.recipient_token_account.to_account_info(),
                authority: ctx.accounts.distribution.to_account_info(),
                mint: ctx.accounts.mint.to_account_info(),
            },
            &[signer_seeds],
        ),
        amount,
        ctx.accounts.mint.decimals,
    )?;

    let distribution = &mut ctx.accounts.distribution;
    distribution.claimed_count = distribution
        .claimed_count
        .checked_add(1)
        .ok_or(DistributorError::MathOverflow)?;

    emit!(Claimed {
        distribution_id,
        index,
        recipient: ctx.accounts.recipient.key(),
        amount,
        timestamp: ctx.accounts.claim_marker.claimed_at,
    });

    Ok(())
}
