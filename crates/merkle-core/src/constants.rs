//! Domain-separation constants for the leaf and distribution-identifier hashes.
//!
//! These must match byte-for-byte between this crate and the on-chain
//! verifier program. Changing either string invalidates every previously
//! committed distribution by construction.

/// Mixed into every leaf digest. Kept distinct from [`DISTRIBUTION_ID_DOMAIN_TAG`]
/// so a collision between the two derivations is structurally impossible.
pub const LEAF_DOMAIN_SEPARATOR: &[u8] = b"merkle-distributor:leaf:v1";

/// Mixed into the distribution-identifier digest.
pub const DISTRIBUTION_ID_DOMAIN_TAG: &[u8] = b"merkle-distributor:distribution-id:v1";

/// Current on-disk `DistributionArtifact` format version.
pub const ARTIFACT_FORMAT_VERSION: &str = "1.0";
