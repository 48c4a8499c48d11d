//! Address derivation for the Merkle Distributor program. These seed
//! strings must match `programs/merkle-distributor/src/constants.rs`
//! verbatim.

use solana_sdk::pubkey::Pubkey;

const DISTRIBUTION_SEED: &[u8] = b"distribution";
const VAULT_SEED: &[u8] = b"vault";
const CLAIM_MARKER_SEED: &[u8] = b"claim";

pub fn distribution_address(program_id: &Pubkey, distribution_id: &[u8; 32]) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISTRIBUTION_SEED, distribution_id], program_id)
}

pub fn vault_address(program_id: &Pubkey, distribution_id: &[u8; 32]) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, distribution_id], program_id)
}

/// The uniqueness marker is seeded from the *distribution account's*
/// pubkey, not the raw `distribution_id` bytes.
pub fn claim_marker_address(program_id: &Pubkey, distribution: &Pubkey, index: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[CLAIM_MARKER_SEED, distribution.as_ref(), &index.to_le_bytes()],
        program_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivations_are_deterministic() {
        let program_id = Pubkey::new_unique();
        let distribution_id = [7u8; 32];
        let (d1, b1) = distribution_address(&program_id, &distribution_id);
        let (d2, b2) = distribution_address(&program_id, &distribution_id);
        assert_eq!((d1, b1), (d2, b2));

        let (vault, _) = vault_address(&program_id, &distribution_id);
        assert_ne!(vault, d1);

        let (marker_0, _) = claim_marker_address(&program_id, &d1, 0);
        let (marker_1, _) = claim_marker_address(&program_id, &d1, 1);
        assert_ne!(marker_0, marker_1);
    }
}
