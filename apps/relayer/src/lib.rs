//! Library surface for the Merkle distribution Relayer, reused by
//! `apps/relayer`'s own binary and by `apps/cli`'s `relay-once` subcommand
//! so the two never duplicate the claim state machine.

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod instructions;
pub mod metrics;
pub mod pda;
pub mod relayer;
pub mod state;

pub use chain::{ChainClient, SolanaRpcClient};
pub use config::{Cli, RelayerConfig};
pub use error::{RelayerError, Result};
pub use relayer::{PassSummary, Relayer};
