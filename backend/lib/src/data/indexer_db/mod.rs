//! Indexer database access module using repository pattern
//!
//! This module provides database access through a repository abstraction,
//! allowing the backend to query the NEAR indexer with support for
//! both production PostgreSQL and mock implementations.

pub mod client;
#[cfg(any(test, feature = "mocks"))]
pub mod mock_repository;
pub mod repository;
#[cfg(test)]
pub mod test_helpers;

pub use client::DBClient;
#[cfg(any(test, feature = "mocks"))]
pub use mock_repository::{MockRepository, MockTransfer};
pub use repository::{error::RepositoryError, postgres::Repository, IndexerOps};
