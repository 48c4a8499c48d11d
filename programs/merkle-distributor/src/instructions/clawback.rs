use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};

use crate::constants::{DISTRIBUTION_SEED, VAULT_SEED};
use crate::errors::DistributorError;
use crate::events::ClawedBack;
use crate::state::Distribution;

/// Sweeps the remaining vault balance back to the authority once the
/// clawback-eligibility window has opened, then closes the distribution
/// account (supplemented feature, see SPEC_FULL.md; not part of the
/// distilled spec's replay/verification contract).
#[derive(Accounts)]
pub struct Clawback<'info> {
    #[account(mut, address = distribution.authority)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        close = authority,
        seeds = [DISTRIBUTION_SEED, distribution.distribution_id.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Account<'info, Distribution>,

    #[account(
        mut,
        seeds = [VAULT_SEED, distribution.distribution_id.as_ref()],
        bump = distribution.vault_bump,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    #[account(address = distribution.mint)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub clawback_receiver: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn clawback(ctx: Context<Clawback>) -> Result<()> {
    let distribution = &ctx.accounts.distribution;
    require!(!distribution.clawed_back, DistributorError::AlreadyClawedBack);
    require!(
        Clock::get()?.unix_timestamp >= distribution.clawback_start_ts,
        DistributorError::ClawbackNotYetEligible
    );

    let amount = ctx.accounts.vault.amount;
    let distribution_id = distribution.distribution_id;
    let signer_seeds: &[&[u8]] = &[
        DISTRIBUTION_SEED,
        distribution_id.as_ref(),
        &[distribution.bump],
    ];

    if amount > 0 {
        token_interface::transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.clawback_receiver.to_account_info(),
                    authority: ctx.accounts.distribution.to_account_info(),
                    mint: ctx.accounts.mint.to_account_info(),
                },
                &[signer_seeds],
            ),
            amount,
            ctx.accounts.mint.decimals,
        )?;
    }

    let distribution = &mut ctx.accounts.distribution;
    distribution.clawed_back = true;

    emit!(ClawedBack {
        distribution_id,
        amount,
        clawback_receiver: ctx.accounts.clawback_receiver.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
