//! The Claim Store: durable per-claim state behind a narrow trait interface.
//! Storage backends are swappable; the relayer depends on [`ClaimStore`]
//! only.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryClaimStore;
pub use postgres::PgClaimStore;
pub use record::{ClaimRecord, ClaimState};
pub use store::ClaimStore;
