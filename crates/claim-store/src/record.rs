//! Per-claim state.

use chrono::{DateTime, Utc};

/// Lifecycle state of one `(distribution_id, index)` claim.
///
/// ```text
/// pending --submit--> submitted --confirm--> confirmed (terminal)
/// pending --submit--> submitted --fail--> failed --submit--> submitted --...
/// confirmed: no outgoing transitions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    Pending,
    Submitted,
    Confirmed,
    Failed,
}

impl ClaimState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimState::Pending => "pending",
            ClaimState::Submitted => "submitted",
            ClaimState::Confirmed => "confirmed",
            ClaimState::Failed => "failed",
        }
    }
}

/// Bookkeeping + identification for one leaf's claim.
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub distribution_id: [u8; 32],
    pub index: u64,
    pub recipient: [u8; 32],
    pub amount: u64,
    pub state: ClaimState,
    pub attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub tx_reference: Option<String>,
    pub last_error_message: Option<String>,
}

impl ClaimRecord {
    pub fn pending(distribution_id: [u8; 32], index: u64, recipient: [u8; 32], amount: u64) -> Self {
        Self {
            distribution_id,
            index,
            recipient,
            amount,
            state: ClaimState::Pending,
            attempts: 0,
            last_attempt_at: None,
            confirmed_at: None,
            tx_reference: None,
            last_error_message: None,
        }
    }
}
