//! In-memory `ClaimStore`, used by tests and by the relayer's own test
//! harness. Not durable — never use in production.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use merkle_core::DistributionArtifact;

use crate::error::{Result, StoreError};
use crate::record::{ClaimRecord, ClaimState};
use crate::store::ClaimStore;

#[derive(Default)]
pub struct InMemoryClaimStore {
    records: Mutex<HashMap<([u8; 32], u64), ClaimRecord>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/operator helper: read a snapshot of one record.
    pub fn get(&self, distribution_id: [u8; 32], index: u64) -> Option<ClaimRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(distribution_id, index))
            .cloned()
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn seed_from_artifact(&self, artifact: &DistributionArtifact) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        for proof in &artifact.proofs {
            records
                .entry((artifact.distribution_id, proof.index))
                .or_insert_with(|| {
                    ClaimRecord::pending(
                        artifact.distribution_id,
                        proof.index,
                        proof.recipient,
                        proof.amount,
                    )
                });
        }
        Ok(())
    }

    async fn next_pending(
        &self,
        distribution_id: [u8; 32],
        max_attempts: u32,
    ) -> Result<Vec<ClaimRecord>> {
        let records = self.records.lock().unwrap();
        let mut pending: Vec<ClaimRecord> = records
            .values()
            .filter(|r| {
                r.distribution_id == distribution_id
                    && matches!(r.state, ClaimState::Pending | ClaimState::Failed)
                    && r.attempts < max_attempts
            })
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.index);
        Ok(pending)
    }

    async fn mark_submitted(&self, distribution_id: [u8; 32], index: u64) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&(distribution_id, index))
            .ok_or(StoreError::NotFound { index })?;
        if record.state == ClaimState::Confirmed {
            return Err(StoreError::ConfirmedIsTerminal { index });
        }
        record.state = ClaimState::Submitted;
        record.attempts += 1;
        record.last_attempt_at = Some(Utc::now());
        Ok(())
    }

    async fn mark_confirmed(
        &self,
        distribution_id: [u8; 32],
        index: u64,
        tx_reference: &str,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&(distribution_id, index))
            .ok_or(StoreError::NotFound { index })?;
        record.state = ClaimState::Confirmed;
        record.tx_reference = Some(tx_reference.to_string());
        record.confirmed_at = Some(Utc::now());
        Ok(())
    }

    async fn mark_failed(
        &self,
        distribution_id: [u8; 32],
        index: u64,
        error_message: &str,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&(distribution_id, index))
            .ok_or(StoreError::NotFound { index })?;
        if record.state == ClaimState::Confirmed {
            return Err(StoreError::ConfirmedIsTerminal { index });
        }
        record.state = ClaimState::Failed;
        record.last_attempt_at = Some(Utc::now());
        record.last_error_message = Some(error_message.to_string());
        Ok(())
    }

    async fn count_unconfirmed(&self, distribution_id: [u8; 32]) -> Result<u64> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|r| r.distribution_id == distribution_id && r.state != ClaimState::Confirmed)
            .count() as u64)
    }
}
