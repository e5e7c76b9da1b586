//! Database client wrapper using repository pattern abstraction
//!
//! This module provides a database client that delegates all operations
//! to an underlying repository implementation, allowing for both production
//! PostgreSQL and mock implementations for testing.

use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    constants::search::{
        MAX_REFERENCE_RESULTS, PAYMENT_REFERENCE_PREFIX, REFERENCE_SEARCH_WINDOW_IN_BLOCKS,
    },
    data::indexer_db::repository::{error::RepositoryError, IndexerOps},
    error::{Error, Result},
    models::TransactionRecord,
};

/// Database client that delegates to a repository implementation
///
/// Every repository failure is logged and surfaced as
/// [`Error::QueryExecution`], whatever its cause.
///
/// ## Usage Example
/// ```ignore
/// use data::indexer_db::{DBClient, Repository};
///
/// // Production usage with PostgreSQL
/// let repo = Repository::new(&config.database).await?;
/// let client = DBClient::new(Arc::new(repo));
///
/// // Test usage with mock
/// let mock_repo = MockRepository::new();
/// let client = DBClient::new(Arc::new(mock_repo));
/// ```
#[derive(Clone)]
pub struct DBClient {
    repository: Arc<dyn IndexerOps>,
}

/// Log a repository failure and wrap it
pub(crate) fn query_failed(operation: &'static str) -> impl FnOnce(RepositoryError) -> Error {
    move |e| {
        error!(operation, error = %e, "Error retrieving data");
        Error::QueryExecution(e)
    }
}

impl DBClient {
    /// Create a new database client with the given repository
    ///
    /// # Arguments
    /// * `repository` - Repository implementation to use for database operations
    pub fn new(repository: Arc<dyn IndexerOps>) -> Self {
        Self { repository }
    }

    /// Test the database connection
    pub async fn test_connection(&self) -> Result<()> {
        self.get_chain_tip().await.map(|_| ())
    }

    /// Height of the most recent block stored by the indexer
    pub async fn get_chain_tip(&self) -> Result<Option<i64>> {
        self.repository
            .latest_block_height()
            .await
            .map_err(query_failed("latest_block_height"))
    }

    /// Transfers to `receiver` acknowledged by the payment contract, newest first
    pub async fn get_recent_transfers(
        &self,
        receiver: &str,
        depth_in_blocks: i64,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>> {
        debug!(receiver, depth_in_blocks, limit, "Fetching recent transfers");

        self.repository
            .recent_transfers(receiver, depth_in_blocks, limit)
            .await
            .map_err(query_failed("recent_transfers"))
    }

    /// Transfers to `receiver` carrying the given payment reference, newest first
    ///
    /// `payment_reference` is expected without its `0x` prefix.
    pub async fn get_transfers_by_reference(
        &self,
        receiver: &str,
        address: &str,
        payment_reference: &str,
    ) -> Result<Vec<TransactionRecord>> {
        let stored_reference = format!("{PAYMENT_REFERENCE_PREFIX}{payment_reference}");
        debug!(receiver, address, payment_reference = %stored_reference, "Fetching transfers by reference");

        self.repository
            .transfers_by_reference(
                receiver,
                address,
                &stored_reference,
                REFERENCE_SEARCH_WINDOW_IN_BLOCKS,
                MAX_REFERENCE_RESULTS,
            )
            .await
            .map_err(query_failed("transfers_by_reference"))
    }
}
