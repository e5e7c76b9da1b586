//! Repository pattern implementation for indexer database lookups.
//!
//! This module provides a clean abstraction over the queries run against the
//! NEAR indexer database.
//!
//! ## Key Components
//! - [`pool::SmartPool`] - Connection pool with automatic test transaction support
//! - [`error::RepositoryError`] - Error types for repository operations
//! - [`IndexerOps`] - Trait defining all database operations
//! - [`postgres::Repository`] - PostgreSQL implementation
//!
//! ## Usage Example
//! ```ignore
//! use repository::{postgres::Repository, IndexerOps};
//!
//! let repo = Repository::new(&database_config).await?;
//! let transfers = repo.recent_transfers("pay.example.near", 1000, 10).await?;
//! ```

use async_trait::async_trait;

use crate::models::TransactionRecord;

pub mod error;
pub mod pool;
pub mod postgres;

use error::RepositoryResult;

/// Read-only operations for indexer data access.
///
/// The indexer database is written by the NEAR indexer only, so there is no
/// mutable counterpart to this trait.
///
/// ## Implementation Notes
/// - Every call acquires its own connection and releases it before returning
/// - Results are ordered by descending block height
#[async_trait]
pub trait IndexerOps: Send + Sync {
    /// Transfers to `receiver` acknowledged by the payment contract callback.
    ///
    /// # Arguments
    /// * `receiver` - Account the transactions were sent to
    /// * `depth_in_blocks` - Number of blocks searched back from the chain tip
    /// * `limit` - Maximum number of results
    async fn recent_transfers(
        &self,
        receiver: &str,
        depth_in_blocks: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<TransactionRecord>>;

    /// Transfers carrying `payment_reference` in their call arguments.
    ///
    /// # Arguments
    /// * `receiver` - Account the transactions were sent to
    /// * `address` - Address supplied by the caller, matched against the receiver as well
    /// * `payment_reference` - Reference as stored, `0x` prefix included
    /// * `window_in_blocks` - Number of blocks searched back from the chain tip
    /// * `limit` - Maximum number of results
    async fn transfers_by_reference(
        &self,
        receiver: &str,
        address: &str,
        payment_reference: &str,
        window_in_blocks: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<TransactionRecord>>;

    /// Height of the most recent indexed block, `None` if no block was indexed yet.
    async fn latest_block_height(&self) -> RepositoryResult<Option<i64>>;
}
