//! Artifact Assembler: payout list -> persisted `DistributionArtifact`, and
//! validation of artifacts read back from storage (spec §4.4).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::error::{CoreError, Result};
use crate::leaf::{derive_distribution_id, PayoutEntry};
use crate::tree::build;
use crate::verify::verify_proof;

mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8; 32], s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes of hex"))
    }
}

mod hex32_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &[[u8; 32]],
        s: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let encoded: Vec<String> = value.iter().map(hex::encode).collect();
        encoded.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Vec<[u8; 32]>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.into_iter()
            .map(|s| {
                let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
                bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes of hex"))
            })
            .collect()
    }
}

/// `u64` fields on the wire are base-10 strings, preserving precision across
/// text transport (JSON numbers lose precision above 2^53).
mod u64_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The identity tuple that derives a `distribution_id` (spec §3).
pub struct DistributionIdentity<'a> {
    pub reward_id: &'a str,
    pub window_id: &'a str,
    pub mint: [u8; 32],
}

/// One recipient's entry in a persisted artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimProof {
    pub index: u64,
    #[serde(with = "hex32")]
    pub recipient: [u8; 32],
    #[serde(with = "u64_str")]
    pub amount: u64,
    #[serde(with = "hex32_vec")]
    pub proof_nodes: Vec<[u8; 32]>,
}

/// The persisted output of building a distribution: root, per-leaf proofs,
/// and envelope metadata for operator audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionArtifact {
    #[serde(with = "hex32")]
    pub distribution_id: [u8; 32],
    #[serde(with = "hex32")]
    pub merkle_root: [u8; 32],
    pub recipient_count: u64,
    #[serde(with = "u64_str")]
    pub total_amount: u64,
    #[serde(with = "hex32")]
    pub source_fingerprint: [u8; 32],
    pub proofs: Vec<ClaimProof>,
    pub format_version: String,
    pub created_at_unix: i64,
}

fn fingerprint(source_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(source_bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Builds a `DistributionArtifact` from a payout list.
///
/// `entries` need not be pre-sorted; they are sorted and checked for index
/// density before leaf encoding. `source_bytes` is the canonical (line-exact)
/// input payload, hashed into `source_fingerprint` for operator audit.
pub fn build_artifact(
    identity: DistributionIdentity<'_>,
    entries: &[PayoutEntry],
    source_bytes: &[u8],
    created_at_unix: i64,
) -> Result<DistributionArtifact> {
    if entries.is_empty() {
        return Err(CoreError::EmptyInput);
    }

    let mut sorted: Vec<PayoutEntry> = entries.to_vec();
    sorted.sort_by_key(|e| e.index);

    let mut seen = HashSet::with_capacity(sorted.len());
    let mut total_amount: u128 = 0;
    for entry in &sorted {
        if !seen.insert(entry.index) {
            return Err(CoreError::DuplicateIndex(entry.index));
        }
        if entry.amount == 0 {
            return Err(CoreError::ZeroAmount(entry.index));
        }
        total_amount += u128::from(entry.amount);
    }
    for i in 0..sorted.len() as u64 {
        if !seen.contains(&i) {
            return Err(CoreError::SparseIndex(i));
        }
    }
    if total_amount > u128::from(u64::MAX) {
        return Err(CoreError::Overflow);
    }
    let total_amount = total_amount as u64;

    let distribution_id = derive_distribution_id(
        identity.reward_id,
        identity.window_id,
        &identity.mint,
        total_amount,
    );

    let leaves: Vec<[u8; 32]> = sorted.iter().map(|e| e.leaf(&distribution_id)).collect();
    let built = build(&leaves)?;

    let proofs = sorted
        .iter()
        .zip(built.proofs.into_iter())
        .map(|(entry, proof_nodes)| ClaimProof {
            index: entry.index,
            recipient: entry.recipient,
            amount: entry.amount,
            proof_nodes,
        })
        .collect();

    Ok(DistributionArtifact {
        distribution_id,
        merkle_root: built.root,
        recipient_count: sorted.len() as u64,
        total_amount,
        source_fingerprint: fingerprint(source_bytes),
        proofs,
        format_version: ARTIFACT_FORMAT_VERSION.to_string(),
        created_at_unix,
    })
}

/// Checks every invariant from spec §3/§4.4 on an artifact loaded from
/// storage. Pass `verify_all_proofs = true` in test contexts; operator-facing
/// callers may pass `false` to sample a single proof instead.
pub fn validate_artifact(artifact: &DistributionArtifact, verify_all_proofs: bool) -> Result<()> {
    if artifact.proofs.len() as u64 != artifact.recipient_count {
        return Err(CoreError::ArtifactInvalid(format!(
            "proofs.len() {} != recipient_count {}",
            artifact.proofs.len(),
            artifact.recipient_count
        )));
    }

    let major = artifact
        .format_version
        .split('.')
        .next()
        .unwrap_or_default();
    let expected_major = ARTIFACT_FORMAT_VERSION.split('.').next().unwrap_or_default();
    if major != expected_major {
        return Err(CoreError::ArtifactInvalid(format!(
            "unsupported format version {} (expected major {})",
            artifact.format_version, expected_major
        )));
    }

    let mut seen = HashSet::with_capacity(artifact.proofs.len());
    let mut sum: u128 = 0;
    for proof in &artifact.proofs {
        if !seen.insert(proof.index) {
            return Err(CoreError::ArtifactInvalid(format!(
                "duplicate index {} in artifact",
                proof.index
            )));
        }
        sum += u128::from(proof.amount);
    }
    for i in 0..artifact.recipient_count {
        if !seen.contains(&i) {
            return Err(CoreError::ArtifactInvalid(format!(
                "indices are not a dense permutation of 0..{}: missing {i}",
                artifact.recipient_count
            )));
        }
    }
    if sum != u128::from(artifact.total_amount) {
        return Err(CoreError::ArtifactInvalid(format!(
            "sum(proofs.amount) {sum} != total_amount {}",
            artifact.total_amount
        )));
    }

    let to_check: Box<dyn Iterator<Item = &ClaimProof>> = if verify_all_proofs {
        Box::new(artifact.proofs.iter())
    } else {
        Box::new(artifact.proofs.iter().take(1))
    };
    for proof in to_check {
        let leaf = crate::leaf::leaf_hash(&artifact.distribution_id, &proof.recipient, proof.amount);
        if !verify_proof(leaf, &proof.proof_nodes, artifact.merkle_root) {
            return Err(CoreError::ArtifactInvalid(format!(
                "proof for index {} does not verify against merkle_root",
                proof.index
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries(n: u64) -> Vec<PayoutEntry> {
        (0..n)
            .map(|i| PayoutEntry {
                index: i,
                recipient: {
                    let mut r = [0u8; 32];
                    r[0..8].copy_from_slice(&i.to_le_bytes());
                    r
                },
                amount: 100 + i,
            })
            .collect()
    }

    #[test]
    fn build_then_validate_round_trips() {
        let entries = sample_entries(7);
        let artifact = build_artifact(
            DistributionIdentity {
                reward_id: "rewards",
                window_id: "week-1",
                mint: [9u8; 32],
            },
            &entries,
            b"recipient,amount\n...",
            1_700_000_000,
        )
        .unwrap();

        assert_eq!(artifact.recipient_count, 7);
        validate_artifact(&artifact, true).unwrap();
    }

    #[test]
    fn single_recipient_has_empty_proof_and_root_equals_leaf() {
        let entries = vec![PayoutEntry {
            index: 0,
            recipient: [5u8; 32],
            amount: 1000,
        }];
        let artifact = build_artifact(
            DistributionIdentity {
                reward_id: "r",
                window_id: "w",
                mint: [1u8; 32],
            },
            &entries,
            b"src",
            0,
        )
        .unwrap();
        assert!(artifact.proofs[0].proof_nodes.is_empty());
        let expected_leaf =
            crate::leaf::leaf_hash(&artifact.distribution_id, &[5u8; 32], 1000);
        assert_eq!(artifact.merkle_root, expected_leaf);
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let mut entries = sample_entries(3);
        entries[2].index = 1;
        let err = build_artifact(
            DistributionIdentity {
                reward_id: "r",
                window_id: "w",
                mint: [1u8; 32],
            },
            &entries,
            b"src",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateIndex(1)));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut entries = sample_entries(3);
        entries[1].amount = 0;
        let err = build_artifact(
            DistributionIdentity {
                reward_id: "r",
                window_id: "w",
                mint: [1u8; 32],
            },
            &entries,
            b"src",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ZeroAmount(1)));
    }

    #[test]
    fn tampered_proof_byte_fails_validation() {
        let entries = sample_entries(5);
        let mut artifact = build_artifact(
            DistributionIdentity {
                reward_id: "r",
                window_id: "w",
                mint: [1u8; 32],
            },
            &entries,
            b"src",
            0,
        )
        .unwrap();
        artifact.proofs[2].proof_nodes[0][0] ^= 1;
        let err = validate_artifact(&artifact, true).unwrap_err();
        assert!(matches!(err, CoreError::ArtifactInvalid(_)));
    }
}
