//! Postgres-backed `ClaimStore`.
//!
//! Schema (applied by the operator, not by this crate):
//!
//! ```sql
//! CREATE TABLE claims (
//!     distribution_id   BYTEA   NOT NULL,
//!     index             BIGINT  NOT NULL,
//!     recipient         BYTEA   NOT NULL,
//!     amount            BIGINT  NOT NULL,
//!     state             TEXT    NOT NULL DEFAULT 'pending',
//!     attempts          INT     NOT NULL DEFAULT 0,
//!     last_attempt_at   TIMESTAMPTZ,
//!     confirmed_at      TIMESTAMPTZ,
//!     tx_reference      TEXT,
//!     last_error_message TEXT,
//!     PRIMARY KEY (distribution_id, index)
//! );
//! ```
//!
//! Queries run through the plain `sqlx::query` runtime API rather than the
//! `query!` compile-time macros, so this crate builds without a live
//! `DATABASE_URL` — the same tradeoff the ingestion side of this system
//! makes for its own Postgres access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::record::{ClaimRecord, ClaimState};
use crate::store::ClaimStore;
use merkle_core::DistributionArtifact;

fn backend_err(context: &str, e: sqlx::Error) -> StoreError {
    warn!(context, error = %e, "claim store backend error");
    StoreError::Backend(e.to_string())
}

pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_state(raw: &str) -> ClaimState {
    match raw {
        "submitted" => ClaimState::Submitted,
        "confirmed" => ClaimState::Confirmed,
        "failed" => ClaimState::Failed,
        _ => ClaimState::Pending,
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> std::result::Result<ClaimRecord, sqlx::Error> {
    let distribution_id: Vec<u8> = row.try_get("distribution_id")?;
    let recipient: Vec<u8> = row.try_get("recipient")?;
    let state: String = row.try_get("state")?;
    let last_attempt_at: Option<DateTime<Utc>> = row.try_get("last_attempt_at")?;
    let confirmed_at: Option<DateTime<Utc>> = row.try_get("confirmed_at")?;

    Ok(ClaimRecord {
        distribution_id: distribution_id.try_into().unwrap_or([0u8; 32]),
        index: row.try_get::<i64, _>("index")? as u64,
        recipient: recipient.try_into().unwrap_or([0u8; 32]),
        amount: row.try_get::<i64, _>("amount")? as u64,
        state: parse_state(&state),
        attempts: row.try_get::<i32, _>("attempts")? as u32,
        last_attempt_at,
        confirmed_at,
        tx_reference: row.try_get("tx_reference")?,
        last_error_message: row.try_get("last_error_message")?,
    })
}

#[async_trait]
impl ClaimStore for PgClaimStore {
    async fn seed_from_artifact(&self, artifact: &DistributionArtifact) -> Result<()> {
        for proof in &artifact.proofs {
            sqlx::query(
                "INSERT INTO claims (distribution_id, index, recipient, amount, state, attempts)
                 VALUES ($1, $2, $3, $4, 'pending', 0)
                 ON CONFLICT (distribution_id, index) DO NOTHING",
            )
            .bind(artifact.distribution_id.to_vec())
            .bind(proof.index as i64)
            .bind(proof.recipient.to_vec())
            .bind(proof.amount as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| backend_err("seed_from_artifact", e))?;
        }
        Ok(())
    }

    async fn next_pending(
        &self,
        distribution_id: [u8; 32],
        max_attempts: u32,
    ) -> Result<Vec<ClaimRecord>> {
        let rows = sqlx::query(
            "SELECT distribution_id, index, recipient, amount, state, attempts,
                    last_attempt_at, confirmed_at, tx_reference, last_error_message
             FROM claims
             WHERE distribution_id = $1
               AND state IN ('pending', 'failed')
               AND attempts < $2
             ORDER BY index ASC",
        )
        .bind(distribution_id.to_vec())
        .bind(max_attempts as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend_err("next_pending", e))?;

        rows.iter()
            .map(row_to_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| backend_err("next_pending:decode", e))
    }

    async fn mark_submitted(&self, distribution_id: [u8; 32], index: u64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE claims
             SET state = 'submitted', attempts = attempts + 1, last_attempt_at = now()
             WHERE distribution_id = $1 AND index = $2 AND state != 'confirmed'",
        )
        .bind(distribution_id.to_vec())
        .bind(index as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| backend_err("mark_submitted", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConfirmedIsTerminal { index });
        }
        Ok(())
    }

    async fn mark_confirmed(
        &self,
        distribution_id: [u8; 32],
        index: u64,
        tx_reference: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE claims
             SET state = 'confirmed', confirmed_at = now(), tx_reference = $3
             WHERE distribution_id = $1 AND index = $2",
        )
        .bind(distribution_id.to_vec())
        .bind(index as i64)
        .bind(tx_reference)
        .execute(&self.pool)
        .await
        .map_err(|e| backend_err("mark_confirmed", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { index });
        }
        Ok(())
    }

    async fn mark_failed(
        &self,
        distribution_id: [u8; 32],
        index: u64,
        error_message: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE claims
             SET state = 'failed', last_attempt_at = now(),
                 last_error_message = $3
             WHERE distribution_id = $1 AND index = $2 AND state != 'confirmed'",
        )
        .bind(distribution_id.to_vec())
        .bind(index as i64)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| backend_err("mark_failed", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConfirmedIsTerminal { index });
        }
        Ok(())
    }

    async fn count_unconfirmed(&self, distribution_id: [u8; 32]) -> Result<u64> {
        let row = sqlx::query(
            "SELECT count(*) AS n FROM claims WHERE distribution_id = $1 AND state != 'confirmed'",
        )
        .bind(distribution_id.to_vec())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| backend_err("count_unconfirmed", e))?;

        let n: i64 = row.try_get("n").map_err(|e| backend_err("count_unconfirmed:decode", e))?;
        Ok(n as u64)
    }
}
