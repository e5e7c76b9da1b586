//! PostgreSQL repository implementation.
//!
//! This module provides the production repository implementation using
//! PostgreSQL as the backing database through diesel-async.
//!
//! ## Key Components
//! - [`Repository`] - PostgreSQL implementation of IndexerOps
//!
//! ## Features
//! - Connection pooling through SmartPool
//! - Automatic test transactions in test mode
//! - Raw SQL lookups from `near-indexer-db` mapped into [`TransactionRecord`]

use async_trait::async_trait;
use near_indexer_db::models::{ChainTip, RecentTransfer, ReferencedTransfer};

use crate::{
    config::DatabaseConfig,
    data::indexer_db::repository::{error::RepositoryResult, pool::SmartPool, IndexerOps},
    models::TransactionRecord,
};

/// PostgreSQL repository implementation.
///
/// Provides all database operations using a connection pool
/// with automatic test transaction management.
pub struct Repository {
    pool: SmartPool,
}

impl Repository {
    /// Create a new Repository for the given database.
    ///
    /// # Arguments
    /// * `config` - Connection string and TLS settings
    pub async fn new(config: &DatabaseConfig) -> RepositoryResult<Self> {
        Ok(Self {
            pool: SmartPool::new(config).await?,
        })
    }
}

#[async_trait]
impl IndexerOps for Repository {
    async fn recent_transfers(
        &self,
        receiver: &str,
        depth_in_blocks: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<TransactionRecord>> {
        let mut conn = self.pool.get().await?;

        let rows =
            RecentTransfer::get_for_receiver(&mut conn, receiver, depth_in_blocks, limit).await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn transfers_by_reference(
        &self,
        receiver: &str,
        address: &str,
        payment_reference: &str,
        window_in_blocks: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<TransactionRecord>> {
        let mut conn = self.pool.get().await?;

        let rows = ReferencedTransfer::get_by_reference(
            &mut conn,
            receiver,
            address,
            payment_reference,
            window_in_blocks,
            limit,
        )
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn latest_block_height(&self) -> RepositoryResult<Option<i64>> {
        let mut conn = self.pool.get().await?;

        Ok(ChainTip::get(&mut conn).await?.block_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        constants::test::{accounts::*, chain::*, references::*, UNREACHABLE_DATABASE_URL},
        data::indexer_db::{
            mock_repository::MockTransfer, repository::error::RepositoryError,
            test_helpers::setup_test_db,
        },
    };

    #[tokio::test]
    async fn unreachable_database_is_a_pool_error() {
        let mut config = Config::default().database;
        config.url = UNREACHABLE_DATABASE_URL.to_string();

        let repo = Repository::new(&config).await.expect("test pool is lazy");

        let err = repo
            .recent_transfers(PAYMENT_CONTRACT, 100, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Pool(_)));

        let err = repo
            .transfers_by_reference(
                PAYMENT_CONTRACT,
                PAYMENT_CONTRACT,
                STORED_PAYMENT_REFERENCE,
                100,
                100,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Pool(_)));
    }

    #[tokio::test]
    async fn empty_chain_has_no_tip() {
        let (_container, config) = setup_test_db(&[]).await;
        let repo = Repository::new(&config).await.expect("db available");

        let tip = repo.latest_block_height().await.expect("able to query tip");
        assert_eq!(tip, None);
    }

    #[tokio::test]
    async fn recent_transfers_skip_unacknowledged_and_system() {
        let acknowledged = MockTransfer::qualifying("tx-ok", CHAIN_TIP - 1, PAYMENT_CONTRACT);
        let without_callback = MockTransfer {
            callback_succeeded: None,
            ..MockTransfer::qualifying("tx-no-callback", CHAIN_TIP - 2, PAYMENT_CONTRACT)
        };
        let failed_callback = MockTransfer {
            callback_succeeded: Some(false),
            ..MockTransfer::qualifying("tx-failed-callback", CHAIN_TIP - 3, PAYMENT_CONTRACT)
        };
        let from_system = MockTransfer {
            predecessor_account_id: near_indexer_db::SYSTEM_ACCOUNT_ID.to_string(),
            ..MockTransfer::qualifying("tx-system", CHAIN_TIP - 4, PAYMENT_CONTRACT)
        };
        let tip = MockTransfer::qualifying("tx-tip", CHAIN_TIP, OTHER_CONTRACT);

        let (_container, config) = setup_test_db(&[
            acknowledged,
            without_callback,
            failed_callback,
            from_system,
            tip,
        ])
        .await;
        let repo = Repository::new(&config).await.expect("db available");

        let transfers = repo
            .recent_transfers(PAYMENT_CONTRACT, 100, 10)
            .await
            .expect("able to fetch transfers");

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].tx_hash, "tx-ok");
        assert_eq!(transfers[0].block_height, CHAIN_TIP - 1);
        assert_eq!(transfers[0].payer, PAYER);
        assert_eq!(transfers[0].deposit, ONE_NEAR);
        assert_eq!(transfers[0].amount, ONE_NEAR);
        assert_eq!(
            transfers[0].payment_reference.as_deref(),
            Some(STORED_PAYMENT_REFERENCE)
        );
    }

    #[tokio::test]
    async fn recent_transfers_newest_first_within_limit() {
        // 7 acknowledged transfers over the last 50 blocks
        let mut fixtures: Vec<MockTransfer> = (0..7)
            .map(|i| {
                MockTransfer::qualifying(
                    &format!("tx-{i}"),
                    CHAIN_TIP - 7 * i,
                    PAYMENT_CONTRACT,
                )
            })
            .collect();
        // 3 that must be left out
        fixtures.push(MockTransfer {
            callback_succeeded: None,
            ..MockTransfer::qualifying("tx-late-1", CHAIN_TIP, PAYMENT_CONTRACT)
        });
        fixtures.push(MockTransfer {
            succeeded: false,
            ..MockTransfer::qualifying("tx-late-2", CHAIN_TIP - 1, PAYMENT_CONTRACT)
        });
        fixtures.push(MockTransfer::qualifying(
            "tx-late-3",
            CHAIN_TIP - 2,
            OTHER_CONTRACT,
        ));

        let (_container, config) = setup_test_db(&fixtures).await;
        let repo = Repository::new(&config).await.expect("db available");

        let transfers = repo
            .recent_transfers(PAYMENT_CONTRACT, 100, 5)
            .await
            .expect("able to fetch transfers");

        let hashes: Vec<_> = transfers.iter().map(|t| t.tx_hash.as_str()).collect();
        assert_eq!(hashes, ["tx-0", "tx-1", "tx-2", "tx-3", "tx-4"]);
    }

    #[tokio::test]
    async fn transfers_by_reference_require_the_prefix() {
        let prefixed = MockTransfer::qualifying("tx-prefixed", CHAIN_TIP - 10, PAYMENT_CONTRACT);
        let bare = MockTransfer {
            payment_reference: Some(PAYMENT_REFERENCE.to_string()),
            ..MockTransfer::qualifying("tx-bare", CHAIN_TIP - 5, PAYMENT_CONTRACT)
        };
        let tip = MockTransfer::qualifying("tx-tip", CHAIN_TIP, OTHER_CONTRACT);

        let (_container, config) = setup_test_db(&[prefixed, bare, tip]).await;
        let repo = Repository::new(&config).await.expect("db available");

        let transfers = repo
            .transfers_by_reference(
                PAYMENT_CONTRACT,
                PAYMENT_CONTRACT,
                STORED_PAYMENT_REFERENCE,
                100_000_000,
                100,
            )
            .await
            .expect("able to fetch transfers");

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].tx_hash, "tx-prefixed");
        assert_eq!(transfers[0].confirmations, Some(10));
        assert_eq!(transfers[0].block_hash, None);
    }
}
