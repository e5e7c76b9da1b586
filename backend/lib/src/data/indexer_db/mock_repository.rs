//! Mock repository implementation for unit testing.
//!
//! Provides an in-memory implementation of the repository pattern that applies
//! the same selection rules as the indexer queries, without requiring a real
//! database connection.

use std::{cmp::Reverse, sync::Arc};

use async_trait::async_trait;
use near_indexer_db::{
    models::{RecentTransfer, ReferencedTransfer},
    SYSTEM_ACCOUNT_ID,
};
use tokio::sync::RwLock;

use crate::{
    constants::mocks::{
        MOCK_BLOCK_TIME, MOCK_DEPOSIT, MOCK_GENESIS_TIMESTAMP, MOCK_METHOD_NAME, MOCK_PAYEE,
        MOCK_PAYER, MOCK_PAYMENT_REFERENCE,
    },
    data::indexer_db::repository::{
        error::{RepositoryError, RepositoryResult},
        IndexerOps,
    },
    models::TransactionRecord,
};

/// A function call transaction together with the transfer receipt it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTransfer {
    pub tx_hash: String,
    /// Height of the block including the transfer receipt
    pub block_height: i64,
    pub signer_account_id: String,
    /// Account the transaction was sent to
    pub receiver_account_id: String,
    /// Account receiving the transfer
    pub payee_account_id: String,
    /// Account that emitted the transfer receipt
    pub predecessor_account_id: String,
    pub deposit: String,
    pub method_name: String,
    pub to: String,
    pub amount: String,
    pub payment_reference: Option<String>,
    /// Whether the transfer receipt executed successfully
    pub succeeded: bool,
    /// Outcome of the payment contract callback, `None` if it was never called
    pub callback_succeeded: Option<bool>,
}

impl MockTransfer {
    /// A transfer sent through `receiver` that every lookup accepts.
    pub fn qualifying(tx_hash: &str, block_height: i64, receiver: &str) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            block_height,
            signer_account_id: MOCK_PAYER.to_string(),
            receiver_account_id: receiver.to_string(),
            payee_account_id: MOCK_PAYEE.to_string(),
            predecessor_account_id: receiver.to_string(),
            deposit: MOCK_DEPOSIT.to_string(),
            method_name: MOCK_METHOD_NAME.to_string(),
            to: MOCK_PAYEE.to_string(),
            amount: MOCK_DEPOSIT.to_string(),
            payment_reference: Some(MOCK_PAYMENT_REFERENCE.to_string()),
            succeeded: true,
            callback_succeeded: Some(true),
        }
    }

    pub fn block_hash(&self) -> String {
        format!("block-{}", self.block_height)
    }

    pub fn block_timestamp(&self) -> i64 {
        MOCK_GENESIS_TIMESTAMP + self.block_height * MOCK_BLOCK_TIME
    }

    fn is_from_system(&self) -> bool {
        self.predecessor_account_id == SYSTEM_ACCOUNT_ID
    }

    fn as_recent(&self) -> TransactionRecord {
        RecentTransfer {
            transaction_hash: self.tx_hash.clone(),
            block_hash: self.block_hash(),
            block_height: self.block_height,
            block_timestamp: self.block_timestamp(),
            payer: self.signer_account_id.clone(),
            payee: self.payee_account_id.clone(),
            deposit: self.deposit.clone(),
            method_name: self.method_name.clone(),
            to: self.to.clone(),
            amount: self.deposit.clone(),
            payment_reference: self.payment_reference.clone().unwrap_or_default(),
        }
        .into()
    }

    fn as_referenced(&self, chain_tip: i64) -> TransactionRecord {
        ReferencedTransfer {
            transaction_hash: self.tx_hash.clone(),
            block_height: self.block_height,
            block_timestamp: self.block_timestamp(),
            payer: self.signer_account_id.clone(),
            payee: self.payee_account_id.clone(),
            deposit: self.deposit.clone(),
            method_name: self.method_name.clone(),
            to: self.to.clone(),
            amount: self.amount.clone(),
            payment_reference: self.payment_reference.clone(),
            confirmations: chain_tip - self.block_height,
        }
        .into()
    }
}

/// Mock repository implementation using in-memory storage
pub struct MockRepository {
    transfers: Arc<RwLock<Vec<MockTransfer>>>,
    /// Highest block seen, including blocks without any transfer
    chain_tip: Arc<RwLock<Option<i64>>>,
    /// When set, every operation fails with this message
    failure: Arc<RwLock<Option<String>>>,
}

impl MockRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            transfers: Arc::new(RwLock::new(Vec::new())),
            chain_tip: Arc::new(RwLock::new(None)),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Store a transfer, moving the chain tip up to its block if needed
    pub async fn insert_transfer(&self, transfer: MockTransfer) {
        self.advance_chain_tip(transfer.block_height).await;
        self.transfers.write().await.push(transfer);
    }

    /// Record that blocks up to `height` were indexed
    pub async fn advance_chain_tip(&self, height: i64) {
        let mut tip = self.chain_tip.write().await;
        *tip = Some(tip.map_or(height, |current| current.max(height)));
    }

    /// Make every following operation fail as if the database was unreachable
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    async fn check_failure(&self) -> RepositoryResult<()> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(RepositoryError::pool(message.clone())),
            None => Ok(()),
        }
    }

    /// Transfers matching `filter`, newest first, at most `limit`
    async fn select(
        &self,
        limit: i64,
        filter: impl Fn(&MockTransfer) -> bool,
    ) -> Vec<MockTransfer> {
        let mut selected: Vec<MockTransfer> = self
            .transfers
            .read()
            .await
            .iter()
            .filter(|&t| filter(t))
            .cloned()
            .collect();
        selected.sort_by_key(|t| Reverse(t.block_height));
        selected.truncate(usize::try_from(limit).unwrap_or(0));
        selected
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexerOps for MockRepository {
    async fn recent_transfers(
        &self,
        receiver: &str,
        depth_in_blocks: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<TransactionRecord>> {
        self.check_failure().await?;

        let Some(tip) = *self.chain_tip.read().await else {
            return Ok(Vec::new());
        };

        let transfers = self
            .select(limit, |t| {
                t.receiver_account_id == receiver
                    && t.succeeded
                    && !t.is_from_system()
                    && t.block_height >= tip - depth_in_blocks
                    && t.callback_succeeded == Some(true)
            })
            .await;

        Ok(transfers.iter().map(MockTransfer::as_recent).collect())
    }

    async fn transfers_by_reference(
        &self,
        receiver: &str,
        address: &str,
        payment_reference: &str,
        window_in_blocks: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<TransactionRecord>> {
        self.check_failure().await?;

        let Some(tip) = *self.chain_tip.read().await else {
            return Ok(Vec::new());
        };

        let transfers = self
            .select(limit, |t| {
                t.receiver_account_id == receiver
                    && t.receiver_account_id == address
                    && t.succeeded
                    && !t.is_from_system()
                    && t.block_height >= tip - window_in_blocks
                    && t.payment_reference.as_deref() == Some(payment_reference)
            })
            .await;

        Ok(transfers.iter().map(|t| t.as_referenced(tip)).collect())
    }

    async fn latest_block_height(&self) -> RepositoryResult<Option<i64>> {
        self.check_failure().await?;

        Ok(*self.chain_tip.read().await)
    }
}
