//! Merkle tree construction and proof emission (spec §4.2).

use sha3::{Digest, Keccak256};

use crate::error::{CoreError, Result};

/// Canonical parent combination: `H( min(a,b) || max(a,b) )`.
///
/// Ordering children by byte value lets the proof verifier fold without
/// carrying a sibling-side bit, which the on-chain verifier never receives.
pub fn fold_pair(a: [u8; 32], b: [u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(lo);
    hasher.update(hi);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Output of building a tree over an ordered leaf sequence: the root and one
/// proof per leaf, indexed identically to the input slice.
pub struct BuiltTree {
    pub root: [u8; 32],
    pub proofs: Vec<Vec<[u8; 32]>>,
}

/// Builds the tree bottom-up and emits a proof for every leaf.
///
/// Odd-length levels duplicate the trailing node against itself rather than
/// promoting it unpaired, so the verifier's fold loop stays unconditional.
/// A single-leaf tree has an empty proof and a root equal to the leaf itself.
pub fn build(leaves: &[[u8; 32]]) -> Result<BuiltTree> {
    if leaves.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    if leaves.len() == 1 {
        return Ok(BuiltTree {
            root: leaves[0],
            proofs: vec![Vec::new()],
        });
    }

    let mut levels: Vec<Vec<[u8; 32]>> = vec![leaves.to_vec()];
    while levels.last().unwrap().len() > 1 {
        let current = levels.last().unwrap();
        let mut next = Vec::with_capacity(current.len().div_ceil(2));
        let mut i = 0;
        while i < current.len() {
            let left = current[i];
            let right = if i + 1 < current.len() {
                current[i + 1]
            } else {
                left
            };
            next.push(fold_pair(left, right));
            i += 2;
        }
        levels.push(next);
    }

    let root = levels.last().unwrap()[0];

    let proofs = (0..leaves.len())
        .map(|leaf_index| {
            let mut idx = leaf_index;
            let mut proof = Vec::with_capacity(levels.len() - 1);
            for level in &levels[..levels.len() - 1] {
                let sibling_idx = idx ^ 1;
                let sibling = if sibling_idx < level.len() {
                    level[sibling_idx]
                } else {
                    level[idx]
                };
                proof.push(sibling);
                idx /= 2;
            }
            proof
        })
        .collect();

    Ok(BuiltTree { root, proofs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify_proof;

    fn leaves_n(n: usize) -> Vec<[u8; 32]> {
        (0..n)
            .map(|i| {
                let mut l = [0u8; 32];
                l[0..8].copy_from_slice(&(i as u64).to_le_bytes());
                l
            })
            .collect()
    }

    #[test]
    fn single_leaf_root_is_the_leaf_with_empty_proof() {
        let leaves = leaves_n(1);
        let built = build(&leaves).unwrap();
        assert_eq!(built.root, leaves[0]);
        assert!(built.proofs[0].is_empty());
        assert!(verify_proof(leaves[0], &built.proofs[0], built.root));
    }

    #[test]
    fn fold_pair_is_commutative() {
        let a = [3u8; 32];
        let b = [9u8; 32];
        assert_eq!(fold_pair(a, b), fold_pair(b, a));
    }

    #[test]
    fn every_proof_verifies_for_sizes_one_through_sixteen() {
        for n in 1..=16 {
            let leaves = leaves_n(n);
            let built = build(&leaves).unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                assert!(
                    verify_proof(*leaf, &built.proofs[i], built.root),
                    "proof failed to verify for n={n}, i={i}"
                );
            }
        }
    }

    #[test]
    fn odd_level_self_sibling_appears_where_predicted() {
        // Three leaves: level 0 has indices 0,1,2. Index 2 is the odd trailing
        // node and pairs with itself at level 0.
        let leaves = leaves_n(3);
        let built = build(&leaves).unwrap();
        let proof_for_2 = &built.proofs[2];
        assert_eq!(proof_for_2.len(), 2);
        assert_eq!(proof_for_2[0], leaves[2]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(build(&[]).unwrap_err(), CoreError::EmptyInput);
    }
}
