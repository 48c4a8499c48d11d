//! Canonical leaf and distribution-identifier encoding (spec §4.1).
//!
//! Both functions are total, deterministic and allocation-light; neither
//! performs I/O or structural validation — that belongs to the artifact
//! assembler.

use sha3::{Digest, Keccak256};

use crate::constants::{DISTRIBUTION_ID_DOMAIN_TAG, LEAF_DOMAIN_SEPARATOR};

/// One payout, as ingested. `index` is assigned positionally by the caller
/// and determines leaf placement; `recipient`/`amount` are the authoritative
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutEntry {
    pub index: u64,
    pub recipient: [u8; 32],
    pub amount: u64,
}

fn keccak_hashv(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// `distribution_id = H( DOMAIN_ID_TAG || reward_id || window_id || mint || total_amount_le )`
///
/// A function of `(reward_id, window_id, mint, total_amount)` alone — changing
/// any one of them changes the identifier, which doubles as a replay/cross-round
/// separator on-chain.
pub fn derive_distribution_id(
    reward_id: &str,
    window_id: &str,
    mint: &[u8; 32],
    total_amount: u64,
) -> [u8; 32] {
    keccak_hashv(&[
        DISTRIBUTION_ID_DOMAIN_TAG,
        reward_id.as_bytes(),
        window_id.as_bytes(),
        mint,
        &total_amount.to_le_bytes(),
    ])
}

/// `leaf = H( DOMAIN_SEPARATOR || distribution_id || recipient || amount_le )`
///
/// No field framing or length prefix — byte concatenation order is fixed and
/// total, matching the on-chain verifier exactly.
pub fn leaf_hash(distribution_id: &[u8; 32], recipient: &[u8; 32], amount: u64) -> [u8; 32] {
    keccak_hashv(&[
        LEAF_DOMAIN_SEPARATOR,
        distribution_id,
        recipient,
        &amount.to_le_bytes(),
    ])
}

impl PayoutEntry {
    pub fn leaf(&self, distribution_id: &[u8; 32]) -> [u8; 32] {
        leaf_hash(distribution_id, &self.recipient, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_id_is_pure_function_of_its_inputs() {
        let mint = [7u8; 32];
        let a = derive_distribution_id("rewards", "week-1", &mint, 1_000_000);
        let b = derive_distribution_id("rewards", "week-1", &mint, 1_000_000);
        assert_eq!(a, b);

        let c = derive_distribution_id("rewards", "week-2", &mint, 1_000_000);
        assert_ne!(a, c);

        let d = derive_distribution_id("rewards", "week-1", &mint, 1_000_001);
        assert_ne!(a, d);
    }

    #[test]
    fn leaf_changes_on_any_single_field() {
        let distribution_id = [1u8; 32];
        let recipient = [2u8; 32];
        let base = leaf_hash(&distribution_id, &recipient, 1000);

        let mut other_id = distribution_id;
        other_id[0] ^= 1;
        assert_ne!(base, leaf_hash(&other_id, &recipient, 1000));

        let mut other_recipient = recipient;
        other_recipient[0] ^= 1;
        assert_ne!(base, leaf_hash(&distribution_id, &other_recipient, 1000));

        assert_ne!(base, leaf_hash(&distribution_id, &recipient, 1001));
    }
}
