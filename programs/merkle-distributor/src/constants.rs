//! PDA seeds (spec §6, "Distribution-identifier seeds"). These seed strings
//! must match the off-chain relayer's address derivation verbatim.

/// Distribution account: `["distribution", distribution_id]`.
pub const DISTRIBUTION_SEED: &[u8] = b"distribution";

/// Vault token account: `["vault", distribution_id]`.
pub const VAULT_SEED: &[u8] = b"vault";

/// Per-leaf uniqueness marker: `["claim", distribution_pubkey, index_le_u64]`.
pub const CLAIM_MARKER_SEED: &[u8] = b"claim";

/// Upper bound on proof length accepted by the `claim` instruction, matching
/// a tree depth large enough for any realistic recipient count (2^32 leaves)
/// while bounding the instruction's compute/account-data cost.
pub const MAX_PROOF_LEN: usize = 32;
