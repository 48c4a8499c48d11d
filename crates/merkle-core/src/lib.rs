//! Deterministic leaf encoding, Merkle tree construction, proof verification,
//! and distribution artifact assembly.
//!
//! This crate is the single source of truth for the byte-exact leaf and
//! proof format that both the off-chain builder/relayer and the on-chain
//! verifier program must agree on. It performs no I/O and carries no ambient
//! state; every function is a pure transform of its arguments.

pub mod artifact;
pub mod constants;
pub mod error;
pub mod leaf;
pub mod tree;
pub mod verify;

pub use artifact::{build_artifact, validate_artifact, ClaimProof, DistributionArtifact, DistributionIdentity};
pub use error::{CoreError, Result};
pub use leaf::{derive_distribution_id, leaf_hash, PayoutEntry};
pub use tree::{build as build_tree, fold_pair, BuiltTree};
pub use verify::verify_proof;
