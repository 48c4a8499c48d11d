//! Minimal, dependency-free reads of the on-chain `Distribution` account.
//!
//! The relayer does not depend on `anchor-lang` (it would pull the whole
//! program-build toolchain into an off-chain binary for the sake of one
//! struct), so this decodes the account layout by byte offset instead,
//! matching `programs/merkle-distributor/src/state.rs::Distribution` field
//! for field. If that struct's layout changes, this must change with it.

use solana_sdk::pubkey::Pubkey;

use crate::error::{RelayerError, Result};

const DISCRIMINATOR_LEN: usize = 8;
const DISTRIBUTION_ID_OFFSET: usize = DISCRIMINATOR_LEN;
const MERKLE_ROOT_OFFSET: usize = DISTRIBUTION_ID_OFFSET + 32;
const MINT_OFFSET: usize = MERKLE_ROOT_OFFSET + 32;
const MINT_END: usize = MINT_OFFSET + 32;

/// Reads the `mint` field out of a raw `Distribution` account's data.
///
/// The mint is read from the chain rather than threaded through the
/// relayer's own config, so a stale or mismatched local value can never
/// diverge from what `initialize` actually committed on-chain.
pub fn read_distribution_mint(data: &[u8]) -> Result<Pubkey> {
    if data.len() < MINT_END {
        return Err(RelayerError::DistributionNotInitialized);
    }
    Ok(Pubkey::try_from(&data[MINT_OFFSET..MINT_END]).expect("32-byte slice"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mint_at_expected_offset() {
        let mint = Pubkey::new_unique();
        let mut data = vec![0u8; MINT_END + 64];
        data[MINT_OFFSET..MINT_END].copy_from_slice(mint.as_ref());
        assert_eq!(read_distribution_mint(&data).unwrap(), mint);
    }

    #[test]
    fn truncated_account_data_is_rejected() {
        let data = vec![0u8; 10];
        assert!(matches!(
            read_distribution_mint(&data),
            Err(RelayerError::DistributionNotInitialized)
        ));
    }
}
