//! Single-pass proof folding (spec §4.3).
//!
//! This is the exact loop the on-chain verifier runs; it is duplicated here
//! (rather than imported from the program crate) because off-chain test and
//! relayer code must not depend on an Anchor program crate.

use crate::tree::fold_pair;

/// Folds `leaf` through `proof_nodes` and checks the result against `root`.
///
/// Constant memory, `O(proof.len())` time, no branch on sibling side — a
/// single differing byte anywhere in `leaf`, `proof_nodes` or `root` flips
/// the result.
pub fn verify_proof(leaf: [u8; 32], proof_nodes: &[[u8; 32]], root: [u8; 32]) -> bool {
    let mut current = leaf;
    for sibling in proof_nodes {
        current = fold_pair(current, *sibling);
    }
    current == root
}
