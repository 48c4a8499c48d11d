//! Payout CSV ingestion: the thin CLI-side adapter that turns a flat payout
//! file into `merkle_core::PayoutEntry` values, in place of whatever balance
//! indexing / eligibility system would normally produce this list.
//!
//! Expected columns: `index,recipient,amount` — `recipient` a base58
//! pubkey string, `amount` a base-10 `u64`.

use std::path::Path;

use merkle_core::PayoutEntry;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct PayoutRow {
    index: u64,
    recipient: String,
    amount: u64,
}

/// Reads and parses a payout CSV into `PayoutEntry` values, in file order.
/// Does not sort, dedupe, or density-check — `merkle_core::build_artifact`
/// already does all three and reports the specific violation.
pub fn read_payout_csv(path: &Path) -> anyhow::Result<(Vec<PayoutEntry>, Vec<u8>)> {
    let raw = std::fs::read(path)?;
    let mut reader = csv::Reader::from_reader(raw.as_slice());

    let mut entries = Vec::new();
    for record in reader.deserialize() {
        let row: PayoutRow = record?;
        let recipient = Pubkey::from_str(&row.recipient)
            .map_err(|e| anyhow::anyhow!("row {}: invalid recipient pubkey: {e}", row.index))?;
        entries.push(PayoutEntry {
            index: row.index,
            recipient: recipient.to_bytes(),
            amount: row.amount,
        });
    }

    Ok((entries, raw))
}
