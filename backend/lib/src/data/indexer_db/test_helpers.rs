use near_indexer_db::TRANSFER_CALLBACK_METHOD;
use serde_json::json;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

use crate::{
    config::{Config, DatabaseConfig},
    data::indexer_db::mock_repository::MockTransfer,
};

/// Minimal indexer schema the lookups run against
pub const INDEXER_SCHEMA_SQL: &str = include_str!("./near-indexer-schema.sql");

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// SQL inserting `transfer` the way the NEAR indexer would have stored it:
/// the function call transaction, its transfer receipt and, if any, the
/// callback receipt produced by the converted receipt.
pub fn seed_transfer_sql(transfer: &MockTransfer) -> String {
    let tx = &transfer.tx_hash;
    let height = transfer.block_height;
    let timestamp = transfer.block_timestamp();
    let converted_receipt = format!("{tx}-converted");
    let transfer_receipt = format!("{tx}-transfer");
    let callback_receipt = format!("{tx}-callback");

    let call_args = json!({
        "method_name": transfer.method_name,
        "deposit": transfer.deposit,
        "gas": 30_000_000_000_000u64,
        "args_json": {
            "to": transfer.to,
            "amount": transfer.amount,
            "payment_reference": transfer.payment_reference,
        },
    });
    let transfer_args = json!({ "deposit": transfer.deposit });

    let mut sql = vec![
        format!(
            "INSERT INTO blocks VALUES ({height}, {}, {timestamp}) ON CONFLICT DO NOTHING;",
            quote(&transfer.block_hash())
        ),
        format!(
            "INSERT INTO transactions VALUES ({}, {timestamp}, {}, {}, {});",
            quote(tx),
            quote(&transfer.signer_account_id),
            quote(&transfer.receiver_account_id),
            quote(&converted_receipt)
        ),
        format!(
            "INSERT INTO transaction_actions VALUES ({}, 0, 'FUNCTION_CALL', {});",
            quote(tx),
            quote(&call_args.to_string())
        ),
        format!(
            "INSERT INTO receipts VALUES ({}, {timestamp}, {}, {}, {});",
            quote(&transfer_receipt),
            quote(&transfer.predecessor_account_id),
            quote(&transfer.payee_account_id),
            quote(tx)
        ),
        format!(
            "INSERT INTO execution_outcomes VALUES ({}, {});",
            quote(&transfer_receipt),
            quote(outcome(transfer.succeeded))
        ),
        format!(
            "INSERT INTO action_receipt_actions VALUES ({}, 0, 'TRANSFER', {});",
            quote(&transfer_receipt),
            quote(&transfer_args.to_string())
        ),
    ];

    if let Some(succeeded) = transfer.callback_succeeded {
        let callback_args = json!({
            "method_name": TRANSFER_CALLBACK_METHOD,
            "deposit": "0",
            "gas": 10_000_000_000_000u64,
        });

        sql.push(format!(
            "INSERT INTO execution_outcome_receipts VALUES ({}, 0, {});",
            quote(&converted_receipt),
            quote(&callback_receipt)
        ));
        sql.push(format!(
            "INSERT INTO action_receipt_actions VALUES ({}, 0, 'FUNCTION_CALL', {});",
            quote(&callback_receipt),
            quote(&callback_args.to_string())
        ));
        sql.push(format!(
            "INSERT INTO execution_outcomes VALUES ({}, {});",
            quote(&callback_receipt),
            quote(outcome(succeeded))
        ));
    }

    sql.join("\n")
}

fn outcome(succeeded: bool) -> &'static str {
    if succeeded {
        "SUCCESS_VALUE"
    } else {
        "FAILURE"
    }
}

/// Setup an indexer-db instance (thru a container) holding the given transfers
///
/// # Arguments:
/// * transfers: the transfers to seed, on top of the indexer schema
pub async fn setup_test_db(transfers: &[MockTransfer]) -> (ContainerAsync<Postgres>, DatabaseConfig) {
    let mut init_sql = vec![INDEXER_SCHEMA_SQL.to_string()];
    init_sql.extend(transfers.iter().map(seed_transfer_sql));

    // A single script keeps the schema ahead of the inserts
    let postgres = Postgres::default()
        .with_db_name("near_indexer")
        .with_user("postgres")
        .with_password("postgres")
        .with_init_sql(init_sql.join("\n").into_bytes());

    let container = postgres
        .start()
        .await
        .expect("Failed to start postgres container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let mut config = Config::default().database;
    config.url = format!("postgres://postgres:postgres@{}:{}/near_indexer", host, port);

    (container, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test::{accounts::*, chain::*};

    #[test]
    fn seeded_callback_only_when_called() {
        let acknowledged = MockTransfer::qualifying("tx-1", CHAIN_TIP, PAYMENT_CONTRACT);
        let sql = seed_transfer_sql(&acknowledged);
        assert!(sql.contains(TRANSFER_CALLBACK_METHOD));
        assert!(sql.contains("'tx-1-callback', 'SUCCESS_VALUE'"));

        let never_called = MockTransfer {
            callback_succeeded: None,
            ..acknowledged
        };
        assert!(!seed_transfer_sql(&never_called).contains(TRANSFER_CALLBACK_METHOD));
    }

    #[test]
    fn seeded_values_are_escaped() {
        let transfer = MockTransfer {
            to: "o'brien.near".to_string(),
            ..MockTransfer::qualifying("tx-1", CHAIN_TIP, PAYMENT_CONTRACT)
        };

        assert!(seed_transfer_sql(&transfer).contains("o''brien.near"));
    }
}
