use near_indexer_db::models::{RecentTransfer, ReferencedTransfer};
use serde::Serialize;

/// A transfer to the payment contract together with the call that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    pub block_height: i64,
    /// Nanoseconds since the unix epoch
    pub block_timestamp: i64,
    pub payer: String,
    pub payee: String,
    /// Attached deposit in yoctoNEAR, empty when the call had none
    pub deposit: String,
    pub method_name: String,
    pub to: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// Only known for lookups by payment reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<i64>,
}

impl From<RecentTransfer> for TransactionRecord {
    fn from(row: RecentTransfer) -> Self {
        Self {
            tx_hash: row.transaction_hash,
            block_hash: Some(row.block_hash),
            block_height: row.block_height,
            block_timestamp: row.block_timestamp,
            payer: row.payer,
            payee: row.payee,
            deposit: row.deposit,
            method_name: row.method_name,
            to: row.to,
            amount: row.amount,
            payment_reference: non_empty(row.payment_reference),
            confirmations: None,
        }
    }
}

impl From<ReferencedTransfer> for TransactionRecord {
    fn from(row: ReferencedTransfer) -> Self {
        Self {
            tx_hash: row.transaction_hash,
            block_hash: None,
            block_height: row.block_height,
            block_timestamp: row.block_timestamp,
            payer: row.payer,
            payee: row.payee,
            deposit: row.deposit,
            method_name: row.method_name,
            to: row.to,
            amount: row.amount,
            payment_reference: row.payment_reference.and_then(non_empty),
            confirmations: Some(row.confirmations),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
