use crate::data::indexer_db::repository::error::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Any failure while acquiring a connection or running a query.
    ///
    /// The original error is kept as the source.
    #[error("Error retrieving data: {0}")]
    QueryExecution(#[from] RepositoryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error was raised by the database layer.
    pub fn is_query_execution(&self) -> bool {
        matches!(self, Self::QueryExecution(_))
    }
}
