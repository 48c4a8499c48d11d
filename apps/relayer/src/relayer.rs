//! The claim lifecycle state machine.
//!
//! One [`Relayer`] drives a single distribution: seed the Claim Store from
//! an artifact, then repeatedly reconcile-batch-submit-settle until every
//! claim is `confirmed`. Batches within one distribution are never processed
//! concurrently — this type's methods take `&self` but the main loop in
//! [`crate::main`] never calls `run_once` for the same distribution from two
//! tasks at once.

use std::sync::Arc;
use std::time::Duration;

use claim_store::{ClaimRecord, ClaimStore};
use merkle_core::DistributionArtifact;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::instruction::create_associated_token_account;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::config::RelayerConfig;
use crate::error::{RelayerError, Result};
use crate::instructions::{associated_token_address, build_claim_instruction};
use crate::metrics;
use crate::pda::{claim_marker_address, distribution_address};
use crate::state::read_distribution_mint;

/// Well-known classic SPL Token program id. Used when the distribution's
/// mint is not owned by Token-2022 (`spl_token_2022::id()`); the relayer
/// has no other source of truth for which token program a distribution was
/// initialized against, so it infers it from the mint account's owner.
const LEGACY_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub struct Relayer {
    config: RelayerConfig,
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn ClaimStore>,
}

/// Outcome of one `run_once` pass, for the caller's main loop to decide
/// whether to keep polling.
#[derive(Debug, Default)]
pub struct PassSummary {
    pub confirmed_this_pass: u64,
    pub failed_this_pass: u64,
    pub reconciled_this_pass: u64,
    pub distribution_completed: bool,
}

impl Relayer {
    pub fn new(config: RelayerConfig, chain: Arc<dyn ChainClient>, store: Arc<dyn ClaimStore>) -> Self {
        Self { config, chain, store }
    }

    /// One full pass over a distribution's pending claims: seed, fetch
    /// pending work, split into batches, process each in turn. Returns once
    /// every currently-pending claim has been attempted; the caller decides
    /// whether to poll again. Cancellable only between batches/passes, never
    /// mid-submission.
    pub async fn run_once(&self, artifact: &DistributionArtifact) -> Result<PassSummary> {
        self.store.seed_from_artifact(artifact).await?;

        let (mint, token_program) = self.resolve_mint_and_token_program(artifact).await?;

        let pending = self
            .store
            .next_pending(artifact.distribution_id, self.config.max_attempts)
            .await?;
        info!(
            distribution_id = %hex::encode(artifact.distribution_id),
            pending = pending.len(),
            "relayer pass starting"
        );

        let mut summary = PassSummary::default();

        for batch in pending.chunks(self.config.batch_size) {
            let outcome = self.process_batch(artifact, batch, &mint, &token_program).await?;
            summary.confirmed_this_pass += outcome.confirmed;
            summary.failed_this_pass += outcome.failed;
            summary.reconciled_this_pass += outcome.reconciled;

            tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
        }

        let unconfirmed = self.store.count_unconfirmed(artifact.distribution_id).await?;
        summary.distribution_completed = unconfirmed == 0;
        if summary.distribution_completed {
            info!(
                distribution_id = %hex::encode(artifact.distribution_id),
                "all claims confirmed, distribution complete"
            );
        }

        Ok(summary)
    }

    /// Reads the distribution's committed mint off-chain (not from the
    /// artifact, which carries no mint field) and infers which token
    /// program it belongs to from the mint account's owner.
    async fn resolve_mint_and_token_program(&self, artifact: &DistributionArtifact) -> Result<(Pubkey, Pubkey)> {
        let (distribution, _) =
            distribution_address(&self.config.program_id, &artifact.distribution_id);
        let account = self
            .chain
            .get_account(&distribution)
            .await?
            .ok_or(RelayerError::DistributionNotInitialized)?;
        let mint = read_distribution_mint(&account.data)?;

        let mint_account = self
            .chain
            .get_account(&mint)
            .await?
            .ok_or(RelayerError::DistributionNotInitialized)?;
        let token_program = if mint_account.owner == spl_token_2022::id() {
            spl_token_2022::id()
        } else {
            LEGACY_TOKEN_PROGRAM_ID
        };
        Ok((mint, token_program))
    }

    async fn process_batch(
        &self,
        artifact: &DistributionArtifact,
        batch: &[ClaimRecord],
        mint: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<BatchOutcome> {
        let (distribution, _) =
            distribution_address(&self.config.program_id, &artifact.distribution_id);

        // (a) Ledger reconciliation: a claim with an existing uniqueness
        // marker has already been irreversibly processed. Never re-submit it
        // in the same batch that discovered it.
        let mut remaining: Vec<&ClaimRecord> = Vec::with_capacity(batch.len());
        let mut reconciled = 0u64;
        for claim in batch {
            let (marker, _) = claim_marker_address(&self.config.program_id, &distribution, claim.index);
            if self.chain.account_exists(&marker).await? {
                metrics::reconciliation_hit();
                self.store
                    .mark_confirmed(artifact.distribution_id, claim.index, "reconciled:already-claimed")
                    .await?;
                reconciled += 1;
                debug!(index = claim.index, "claim already confirmed on-chain, skipping");
                continue;
            }
            remaining.push(claim);
        }

        if remaining.is_empty() {
            return Ok(BatchOutcome { confirmed: 0, failed: 0, reconciled });
        }

        // (b) Account preparation + (c) instruction assembly.
        let proof_for = |claim: &ClaimRecord| -> &[[u8; 32]] {
            artifact
                .proofs
                .iter()
                .find(|p| p.index == claim.index)
                .map(|p| p.proof_nodes.as_slice())
                .unwrap_or(&[])
        };

        let mut instructions: Vec<Instruction> =
            vec![ComputeBudgetInstruction::set_compute_unit_limit(self.config.compute_unit_limit)];
        if self.config.compute_unit_price_micro > 0 {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
                self.config.compute_unit_price_micro,
            ));
        }

        let payer = self.config.payer.pubkey();
        for claim in &remaining {
            let recipient = Pubkey::new_from_array(claim.recipient);
            let ata = associated_token_address(&recipient, mint, token_program);

            if !self.chain.account_exists(&ata).await? {
                instructions.push(create_associated_token_account(
                    &payer,
                    &recipient,
                    mint,
                    token_program,
                ));
            }

            instructions.push(build_claim_instruction(
                &self.config.program_id,
                &payer,
                &recipient,
                &artifact.distribution_id,
                mint,
                &ata,
                token_program,
                claim.index,
                claim.amount,
                proof_for(claim),
            ));
        }

        // (d) Optimistic state update — before broadcast, so a crash after
        // broadcast never silently repeats the work.
        for claim in &remaining {
            self.store.mark_submitted(artifact.distribution_id, claim.index).await?;
        }

        // (e) Submission, with bounded transaction-level retries distinct
        // from the per-claim attempt counter (already advanced by (d)).
        metrics::batch_submitted();
        let settlement = self.submit_with_retries(&instructions, &self.config.payer).await;

        // (f) Settlement.
        match settlement {
            Ok(signature) => {
                for claim in &remaining {
                    self.store
                        .mark_confirmed(artifact.distribution_id, claim.index, &signature)
                        .await?;
                }
                metrics::claims_confirmed(remaining.len() as u64);
                Ok(BatchOutcome { confirmed: remaining.len() as u64, failed: 0, reconciled })
            }
            Err(RelayerError::ProofInvalid) => {
                // Terminal, protocol-level: surfaced immediately, not retried.
                Err(RelayerError::ProofInvalid)
            }
            Err(RelayerError::InsufficientFunds) => {
                // Terminal for the whole distribution.
                Err(RelayerError::InsufficientFunds)
            }
            Err(other) => {
                let message = other.to_string();
                warn!(error = %message, indices = ?remaining.iter().map(|c| c.index).collect::<Vec<_>>(), "batch failed after retries");
                for claim in &remaining {
                    self.store
                        .mark_failed(artifact.distribution_id, claim.index, &message)
                        .await?;
                }
                metrics::claims_failed(remaining.len() as u64);
                Ok(BatchOutcome { confirmed: 0, failed: remaining.len() as u64, reconciled })
            }
        }
    }

    async fn submit_with_retries(&self, instructions: &[Instruction], payer: &Keypair) -> Result<String> {
        let mut last_err = RelayerError::TransportFailure("no attempts made".into());
        for attempt in 0..self.config.max_submit_retries {
            let blockhash = self.chain.latest_blockhash().await?;
            let tx = Transaction::new_signed_with_payer(
                instructions,
                Some(&payer.pubkey()),
                &[payer],
                blockhash,
            );
            match self.chain.send_and_confirm(&tx).await {
                Ok(signature) => return Ok(signature),
                Err(RelayerError::ProofInvalid) => return Err(RelayerError::ProofInvalid),
                Err(RelayerError::InsufficientFunds) => return Err(RelayerError::InsufficientFunds),
                Err(e @ (RelayerError::TransportFailure(_) | RelayerError::Expired)) => {
                    warn!(attempt, error = %e, "transaction attempt failed, retrying");
                    last_err = e;
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(other) => return Err(other),
            }
        }
        Err(last_err)
    }
}

struct BatchOutcome {
    confirmed: u64,
    failed: u64,
    reconciled: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{MockChainClient, ScriptedOutcome};
    use claim_store::InMemoryClaimStore;
    use merkle_core::{build_artifact, DistributionIdentity, PayoutEntry};
    use solana_sdk::signature::Keypair;

    fn sample_artifact(n: u64) -> DistributionArtifact {
        let entries: Vec<PayoutEntry> = (0..n)
            .map(|i| PayoutEntry {
                index: i,
                recipient: {
                    let mut r = [0u8; 32];
                    r[0..8].copy_from_slice(&i.to_le_bytes());
                    r
                },
                amount: 100 + i,
            })
            .collect();
        build_artifact(
            DistributionIdentity { reward_id: "r", window_id: "w", mint: [9u8; 32] },
            &entries,
            b"src",
            0,
        )
        .unwrap()
    }

    fn test_config(payer: Keypair, program_id: Pubkey) -> RelayerConfig {
        RelayerConfig {
            rpc_endpoint: "http://localhost:8899".into(),
            payer,
            program_id,
            batch_size: 1,
            max_attempts: 3,
            retry_delay_ms: 0,
            batch_delay_ms: 0,
            compute_unit_limit: 200_000,
            compute_unit_price_micro: 0,
            max_submit_retries: 3,
        }
    }

    fn seed_chain_for_distribution(chain: &MockChainClient, program_id: &Pubkey, artifact: &DistributionArtifact, mint: Pubkey) {
        let (distribution, _) = distribution_address(program_id, &artifact.distribution_id);
        let mut data = vec![0u8; 179];
        data[72..104].copy_from_slice(mint.as_ref());
        chain.set_account_data(distribution, data, Pubkey::default());
        chain.set_account_data(mint, vec![0u8; 82], LEGACY_TOKEN_PROGRAM_ID);
    }

    #[tokio::test]
    async fn already_claimed_reconciles_without_submission() {
        let program_id = Pubkey::new_unique();
        let payer = Keypair::new();
        let artifact = sample_artifact(1);

        let chain = Arc::new(MockChainClient::default());
        seed_chain_for_distribution(&chain, &program_id, &artifact, Pubkey::new_unique());
        let (distribution, _) = distribution_address(&program_id, &artifact.distribution_id);
        let (marker, _) = claim_marker_address(&program_id, &distribution, 0);
        chain.mark_existing(marker);

        let store = Arc::new(InMemoryClaimStore::new());
        let relayer = Relayer::new(test_config(payer, program_id), chain, store.clone());

        let summary = relayer.run_once(&artifact).await.unwrap();
        assert_eq!(summary.reconciled_this_pass, 1);
        assert_eq!(summary.confirmed_this_pass, 0);
        assert!(summary.distribution_completed);

        let record = store.get(artifact.distribution_id, 0).unwrap();
        assert!(matches!(record.state, claim_store::ClaimState::Confirmed));
    }

    #[tokio::test]
    async fn transient_failures_retry_then_confirm() {
        let program_id = Pubkey::new_unique();
        let payer = Keypair::new();
        let artifact = sample_artifact(1);

        let chain = Arc::new(MockChainClient::default());
        seed_chain_for_distribution(&chain, &program_id, &artifact, Pubkey::new_unique());
        chain.send_outcomes.lock().unwrap().extend([
            ScriptedOutcome::Fail(RelayerError::TransportFailure("timeout".into())),
            ScriptedOutcome::Fail(RelayerError::TransportFailure("timeout".into())),
            ScriptedOutcome::Confirm("sig-final".into()),
        ]);

        let store = Arc::new(InMemoryClaimStore::new());
        let relayer = Relayer::new(test_config(payer, program_id), chain, store.clone());

        let summary = relayer.run_once(&artifact).await.unwrap();
        assert_eq!(summary.confirmed_this_pass, 1);
        assert!(summary.distribution_completed);

        let record = store.get(artifact.distribution_id, 0).unwrap();
        assert!(matches!(record.state, claim_store::ClaimState::Confirmed));
        assert_eq!(record.tx_reference.as_deref(), Some("sig-final"));
        assert_eq!(record.attempts, 1, "one mark_submitted per main-loop pass");
    }

    #[tokio::test]
    async fn exhausted_retries_mark_failed_and_stay_retryable() {
        let program_id = Pubkey::new_unique();
        let payer = Keypair::new();
        let artifact = sample_artifact(1);

        let chain = Arc::new(MockChainClient::default());
        seed_chain_for_distribution(&chain, &program_id, &artifact, Pubkey::new_unique());
        chain.send_outcomes.lock().unwrap().extend([
            ScriptedOutcome::Fail(RelayerError::TransportFailure("down".into())),
            ScriptedOutcome::Fail(RelayerError::TransportFailure("down".into())),
            ScriptedOutcome::Fail(RelayerError::TransportFailure("down".into())),
        ]);

        let store = Arc::new(InMemoryClaimStore::new());
        let relayer = Relayer::new(test_config(payer, program_id), chain, store.clone());

        let summary = relayer.run_once(&artifact).await.unwrap();
        assert_eq!(summary.failed_this_pass, 1);
        assert!(!summary.distribution_completed);

        let record = store.get(artifact.distribution_id, 0).unwrap();
        assert!(matches!(record.state, claim_store::ClaimState::Failed));
        assert_eq!(record.attempts, 1);
    }
}
