//! Instruction encoding for the Merkle Distributor program.
//!
//! Account ordering here matches the `Accounts` struct declared in
//! `programs/merkle-distributor/src/instructions/claim.rs` field-for-field —
//! Anchor requires the account-metas list and the struct's field order to
//! agree exactly.

use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::pda::{claim_marker_address, distribution_address, vault_address};

fn anchor_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let digest = Sha256::digest(preimage.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Builds the `claim(index, amount, proof)` instruction for one recipient.
///
/// Wire layout: 8-byte Anchor discriminator, `index` (u64 LE), `amount`
/// (u64 LE), `proof_len` (u32 LE), then `proof_len` 32-byte nodes.
#[allow(clippy::too_many_arguments)]
pub fn build_claim_instruction(
    program_id: &Pubkey,
    payer: &Pubkey,
    recipient: &Pubkey,
    distribution_id: &[u8; 32],
    mint: &Pubkey,
    recipient_token_account: &Pubkey,
    token_program: &Pubkey,
    index: u64,
    amount: u64,
    proof: &[[u8; 32]],
) -> Instruction {
    let (distribution, _) = distribution_address(program_id, distribution_id);
    let (vault, _) = vault_address(program_id, distribution_id);
    let (claim_marker, _) = claim_marker_address(program_id, &distribution, index);

    let mut data = Vec::with_capacity(8 + 8 + 8 + 4 + proof.len() * 32);
    data.extend_from_slice(&anchor_discriminator("claim"));
    data.extend_from_slice(&index.to_le_bytes());
    data.extend_from_slice(&amount.to_le_bytes());
    data.extend_from_slice(&(proof.len() as u32).to_le_bytes());
    for node in proof {
        data.extend_from_slice(node);
    }

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(*recipient, false),
        AccountMeta::new(distribution, false),
        AccountMeta::new(claim_marker, false),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(*recipient_token_account, false),
        AccountMeta::new_readonly(*token_program, false),
        AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Derives the recipient's associated token account address, matching the
/// `spl-associated-token-account` seed scheme
/// `[owner, token_program, mint]` under the ATA program.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_is_stable() {
        let a = anchor_discriminator("claim");
        let b = anchor_discriminator("claim");
        assert_eq!(a, b);
        assert_ne!(a, anchor_discriminator("initialize"));
    }

    #[test]
    fn claim_instruction_encodes_proof_length_and_nodes() {
        let program_id = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ata = Pubkey::new_unique();
        let token_program = Pubkey::new_unique();
        let proof = vec![[1u8; 32], [2u8; 32]];

        let ix = build_claim_instruction(
            &program_id,
            &payer,
            &recipient,
            &[9u8; 32],
            &mint,
            &ata,
            &token_program,
            5,
            1000,
            &proof,
        );

        assert_eq!(ix.accounts.len(), 10);
        assert_eq!(&ix.data[0..8], &anchor_discriminator("claim"));
        assert_eq!(&ix.data[8..16], &5u64.to_le_bytes());
        assert_eq!(&ix.data[16..24], &1000u64.to_le_bytes());
        assert_eq!(&ix.data[24..28], &2u32.to_le_bytes());
        assert_eq!(ix.data.len(), 28 + 64);
    }
}
