//! Payment transaction lookups against the indexer

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::{NearConfig, SearchConfig},
    data::indexer_db::DBClient,
    error::{Error, Result},
    models::TransactionRecord,
};

/// Service looking up the transfers received by the payment contract
#[derive(Clone)]
pub struct TransactionQueryService {
    postgres: Arc<DBClient>,
    contract_name: String,
    search: SearchConfig,
}

impl TransactionQueryService {
    pub fn new(postgres: Arc<DBClient>, near: &NearConfig, search: &SearchConfig) -> Self {
        Self {
            postgres,
            contract_name: near.contract_name.clone(),
            search: search.clone(),
        }
    }

    /// Account whose incoming transfers are looked up
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// Most recent transfers to the payment contract acknowledged by its callback.
    ///
    /// # Arguments
    /// * `depth_in_blocks` - Blocks searched back from the chain tip, configured default if `None`
    /// * `limit` - Maximum number of results, configured default if `None`
    pub async fn fetch_recent_transactions(
        &self,
        depth_in_blocks: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionRecord>> {
        let depth_in_blocks = positive(
            "depth_in_blocks",
            depth_in_blocks.unwrap_or(self.search.max_search_depth_in_blocks),
        )?;
        let limit = positive(
            "limit",
            limit.unwrap_or(self.search.limit_lines_of_result),
        )?;

        let transactions = self
            .postgres
            .get_recent_transfers(&self.contract_name, depth_in_blocks, limit)
            .await?;

        info!(
            contract = %self.contract_name,
            count = transactions.len(),
            "Fetched recent transactions"
        );
        Ok(transactions)
    }

    /// Transfers to the payment contract carrying `payment_reference`.
    ///
    /// # Arguments
    /// * `address` - Address of the payer as supplied by the caller
    /// * `payment_reference` - Hex encoded reference, without `0x` prefix
    pub async fn fetch_transactions_by_reference(
        &self,
        address: &str,
        payment_reference: &str,
    ) -> Result<Vec<TransactionRecord>> {
        if payment_reference.is_empty()
            || !payment_reference.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(Error::InvalidInput(format!(
                "payment reference must be hex without 0x prefix, got {payment_reference:?}"
            )));
        }

        let transactions = self
            .postgres
            .get_transfers_by_reference(&self.contract_name, address, payment_reference)
            .await?;

        debug!(
            payment_reference,
            count = transactions.len(),
            "Fetched transactions by reference"
        );
        Ok(transactions)
    }
}

fn positive(name: &str, value: i64) -> Result<i64> {
    if value > 0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
