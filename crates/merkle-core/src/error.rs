use thiserror::Error;

/// Error taxonomy for leaf encoding, tree construction and artifact handling.
///
/// `InputInvalid`, `Overflow` and `ArtifactInvalid` are build/load-time and
/// fatal to the operation that raised them; none of them are retried by a
/// caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("empty leaf sequence")]
    EmptyInput,

    #[error("duplicate index {0}")]
    DuplicateIndex(u64),

    #[error("indices are not a dense permutation of 0..n (missing {0})")]
    SparseIndex(u64),

    #[error("zero amount at index {0}")]
    ZeroAmount(u64),

    #[error("sum of amounts overflows u64")]
    Overflow,

    #[error("artifact invalid: {0}")]
    ArtifactInvalid(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
