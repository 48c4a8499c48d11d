//! Ledger RPC boundary.
//!
//! The relayer depends on this trait, not on `solana-client` directly, so
//! the claim state-machine tests can run against a scripted mock instead of
//! a live validator.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

use crate::error::{RelayerError, Result};

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetches an account's data and owner, or `None` if it does not exist.
    /// Used both to check the uniqueness marker (replay reconciliation) and
    /// the recipient's token account (create-if-missing), and to read back
    /// the `Distribution` and mint accounts.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// A recent blockhash for transaction construction.
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submits `tx` and waits for confirmation. Returns the transaction
    /// signature (the `tx_reference` recorded against confirmed claims) on
    /// success, or a [`RelayerError::TransportFailure`] /
    /// [`RelayerError::Expired`] on a recoverable failure. Errors
    /// attributable to the program itself (invalid proof, insufficient
    /// vault funds) are surfaced as their specific variants so the caller
    /// does not retry them as if they were transient.
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<String>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        Ok(self.get_account(address).await?.is_some())
    }
}

pub struct SolanaRpcClient {
    inner: RpcClient,
}

impl SolanaRpcClient {
    pub fn new(rpc_endpoint: &str) -> Self {
        Self {
            inner: RpcClient::new_with_commitment(
                rpc_endpoint.to_string(),
                CommitmentConfig::confirmed(),
            ),
        }
    }
}

#[async_trait]
impl ChainClient for SolanaRpcClient {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        match self.inner.get_account(address).await {
            Ok(account) => Ok(Some(account)),
            Err(e) if is_account_not_found(&e) => Ok(None),
            Err(e) => Err(RelayerError::TransportFailure(e.to_string())),
        }
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.inner
            .get_latest_blockhash()
            .await
            .map_err(|e| RelayerError::TransportFailure(e.to_string()))
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<String> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            ..Default::default()
        };
        let signature = self
            .inner
            .send_and_confirm_transaction_with_spinner_and_config(
                tx,
                CommitmentConfig::confirmed(),
                config,
            )
            .await
            .map_err(classify_send_error)?;
        Ok(signature.to_string())
    }
}

fn is_account_not_found(err: &solana_client::client_error::ClientError) -> bool {
    err.to_string().contains("AccountNotFound") || err.to_string().contains("could not find account")
}

fn classify_send_error(err: solana_client::client_error::ClientError) -> RelayerError {
    let msg = err.to_string();
    if msg.contains("BlockhashNotFound") || msg.contains("expired") {
        RelayerError::Expired
    } else if msg.contains("InsufficientFunds") || msg.contains("insufficient") {
        RelayerError::InsufficientFunds
    } else if msg.contains("InvalidProof") || (msg.contains("custom program error") && msg.contains("0x2")) {
        RelayerError::ProofInvalid
    } else {
        RelayerError::TransportFailure(msg)
    }
}

#[cfg(test)]
pub mod mock {
    //! A scripted [`ChainClient`] for relayer unit tests: each call to
    //! `send_and_confirm` pops the next outcome off a pre-loaded queue.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    pub enum ScriptedOutcome {
        Confirm(String),
        Fail(RelayerError),
    }

    #[derive(Default)]
    pub struct MockChainClient {
        pub existing_accounts: Mutex<HashSet<Pubkey>>,
        pub accounts: Mutex<HashMap<Pubkey, Account>>,
        pub send_outcomes: Mutex<Vec<ScriptedOutcome>>,
    }

    impl MockChainClient {
        pub fn mark_existing(&self, address: Pubkey) {
            self.existing_accounts.lock().unwrap().insert(address);
        }

        /// Seeds a full account (data + owner) for tests that need the
        /// relayer to decode specific bytes back out (e.g. the
        /// `Distribution` account's `mint` field).
        pub fn set_account_data(&self, address: Pubkey, data: Vec<u8>, owner: Pubkey) {
            self.accounts.lock().unwrap().insert(
                address,
                Account { lamports: 1, data, owner, executable: false, rent_epoch: 0 },
            );
        }
    }

    #[async_trait]
    impl ChainClient for MockChainClient {
        async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
            if let Some(account) = self.accounts.lock().unwrap().get(address) {
                return Ok(Some(account.clone()));
            }
            if self.existing_accounts.lock().unwrap().contains(address) {
                Ok(Some(Account::default()))
            } else {
                Ok(None)
            }
        }

        async fn latest_blockhash(&self) -> Result<Hash> {
            Ok(Hash::default())
        }

        async fn send_and_confirm(&self, _tx: &Transaction) -> Result<String> {
            let mut outcomes = self.send_outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Err(RelayerError::TransportFailure("mock exhausted".into()));
            }
            match outcomes.remove(0) {
                ScriptedOutcome::Confirm(sig) => Ok(sig),
                ScriptedOutcome::Fail(e) => Err(e),
            }
        }
    }
}
