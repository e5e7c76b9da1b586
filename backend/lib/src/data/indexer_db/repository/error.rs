//! Error types for repository operations.
//!
//! ## Key Components
//! - [`RepositoryError`] - Main error type for all repository operations
//!
//! ## Error Categories
//! - Database errors from diesel operations
//! - Connection pool errors

use thiserror::Error;

/// Main error type for repository operations.
///
/// Callers of the query operations never see these variants directly: they are
/// wrapped into [`crate::error::Error::QueryExecution`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation error from diesel
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Connection pool error, including failures to establish a connection
    #[error("Pool error: {0}")]
    Pool(String),
}

impl RepositoryError {
    /// Create a new Pool error with the given message.
    ///
    /// # Arguments
    /// * `msg` - Description of the pool or connection problem
    pub fn pool(msg: impl Into<String>) -> Self {
        Self::Pool(msg.into())
    }
}

/// Type alias for Results that may fail with RepositoryError
pub type RepositoryResult<T> = Result<T, RepositoryError>;
