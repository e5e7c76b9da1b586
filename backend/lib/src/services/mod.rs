//! Services module for the NEAR payments backend

pub mod transactions;

use std::sync::Arc;

use tracing::info;

use crate::{
    config::Config,
    data::indexer_db::{client::query_failed, DBClient, Repository},
    error::Result,
};

use transactions::TransactionQueryService;

#[derive(Clone)]
pub struct Services {
    pub transactions: Arc<TransactionQueryService>,
    pub postgres: Arc<DBClient>,
}

impl Services {
    pub fn new(postgres: Arc<DBClient>, config: &Config) -> Self {
        let transactions = Arc::new(TransactionQueryService::new(
            postgres.clone(),
            &config.near,
            &config.search,
        ));
        Self {
            transactions,
            postgres,
        }
    }

    /// Connect to the indexer described by `config` and build the services on top of it.
    ///
    /// Fails if the database cannot be reached, so a wrong connection string
    /// is caught at startup rather than on the first lookup.
    pub async fn from_config(config: &Config) -> Result<Self> {
        #[cfg(feature = "mocks")]
        {
            if config.database.mock_mode {
                info!("Using mock repository (mock_mode enabled)");

                let mock_repo = crate::data::indexer_db::MockRepository::new();
                let client = DBClient::new(Arc::new(mock_repo));
                client.test_connection().await?;

                return Ok(Self::new(Arc::new(client), config));
            }
        }

        let repository = Repository::new(&config.database)
            .await
            .map_err(query_failed("connect"))?;
        let client = DBClient::new(Arc::new(repository));
        client.test_connection().await?;

        info!(
            environment = ?config.environment,
            contract = %config.near.contract_name,
            "Connected to NEAR indexer database"
        );
        Ok(Self::new(Arc::new(client), config))
    }
}

#[cfg(any(test, feature = "mocks"))]
impl Services {
    /// Services over an empty in-memory repository
    pub fn mocks() -> Self {
        use crate::data::indexer_db::MockRepository;

        let client = DBClient::new(Arc::new(MockRepository::new()));
        Self::new(Arc::new(client), &Config::default())
    }
}
