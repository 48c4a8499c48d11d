use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("claim store backend error: {0}")]
    Backend(String),

    #[error("no claim record for (distribution_id, index={index})")]
    NotFound { index: u64 },

    #[error("illegal transition out of confirmed state for index={index}")]
    ConfirmedIsTerminal { index: u64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
