use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{DISTRIBUTION_SEED, VAULT_SEED};
use crate::errors::DistributorError;
use crate::events::DistributionInitialized;
use crate::state::Distribution;

/// Allocates the distribution account and its vault, both derived
/// deterministically from `distribution_id` (spec §4.7). Callable only by
/// whoever signs this instruction — in production that signer is the
/// multisig authority's executed transaction; this program has no separate
/// notion of "the authority" beyond whoever funds `initialize`.
#[derive(Accounts)]
#[instruction(distribution_id: [u8; 32])]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = Distribution::LEN,
        seeds = [DISTRIBUTION_SEED, distribution_id.as_ref()],
        bump,
    )]
    pub distribution: Account<'info, Distribution>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, distribution_id.as_ref()],
        bump,
        token::mint = mint,
        token::authority = distribution,
        token::token_program = token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn initialize(
    ctx: Context<Initialize>,
    distribution_id: [u8; 32],
    merkle_root: [u8; 32],
    total_amount: u64,
    recipient_count: u64,
    clawback_start_ts: i64,
) -> Result<()> {
    require!(recipient_count > 0, DistributorError::EmptyDistribution);

    let distribution = &mut ctx.accounts.distribution;
    distribution.distribution_id = distribution_id;
    distribution.merkle_root = merkle_root;
    distribution.mint = ctx.accounts.mint.key();
    distribution.authority = ctx.accounts.authority.key();
    distribution.recipient_count = recipient_count;
    distribution.total_amount = total_amount;
    distribution.claimed_count = 0;
    distribution.created_at = Clock::get()?.unix_timestamp;
    distribution.clawback_start_ts = clawback_start_ts;
    distribution.clawed_back = false;
    distribution.bump = ctx.bumps.distribution;
    distribution.vault_bump = ctx.bumps.vault;

    emit!(DistributionInitialized {
        distribution_id,
        distribution: ctx.accounts.distribution.key(),
        merkle_root,
        mint: ctx.accounts.mint.key(),
        recipient_count,
        total_amount,
        timestamp: ctx.accounts.distribution.created_at,
    });

    Ok(())
}
