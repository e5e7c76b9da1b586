//! SQL run against the indexer database.
//!
//! All lookups join a transaction carrying a `FUNCTION_CALL` action to the
//! `TRANSFER` receipt it originated, keeping only transfers that executed
//! successfully and that were not emitted by the `system` account.

/// Recent transfers received by an account that were acknowledged by the
/// payment contract callback.
///
/// Binds:
/// * `$1` - receiver account of the transaction (`Text`)
/// * `$2` - depth in blocks, counted back from the chain tip (`BigInt`)
/// * `$3` - maximum number of rows (`BigInt`)
pub const RECENT_TRANSFERS_QUERY: &str = r#"
SELECT t.transaction_hash,
       b.block_hash,
       b.block_height::BIGINT AS block_height,
       t.block_timestamp::BIGINT AS block_timestamp,
       t.signer_account_id AS payer,
       r.receiver_account_id AS payee,
       COALESCE(a.args::json->>'deposit', '') AS deposit,
       COALESCE(a.args::json->>'method_name', '') AS method_name,
       COALESCE((a.args::json->'args_json')::json->>'to', '') AS "to",
       COALESCE(a.args::json->>'deposit', '') AS amount,
       COALESCE((a.args::json->'args_json')::json->>'payment_reference', '') AS payment_reference
FROM transactions t,
     receipts r,
     blocks b,
     transaction_actions a,
     action_receipt_actions ra,
     execution_outcomes e
WHERE t.transaction_hash = r.originated_from_transaction_hash
  AND r.receipt_id = e.receipt_id
  AND b.block_timestamp = r.included_in_block_timestamp
  AND ra.receipt_id = r.receipt_id
  AND ra.action_kind = 'TRANSFER'
  AND t.transaction_hash = a.transaction_hash
  AND a.action_kind = 'FUNCTION_CALL'
  AND e.status = 'SUCCESS_VALUE'
  AND r.predecessor_account_id != 'system'
  AND t.receiver_account_id = $1
  AND b.block_height >=
      (SELECT block_height FROM blocks ORDER BY block_height DESC LIMIT 1) - $2
  AND EXISTS(
    SELECT 1
    FROM execution_outcome_receipts eor,
         action_receipt_actions ara,
         execution_outcomes eo
    WHERE eor.executed_receipt_id = t.converted_into_receipt_id
      AND ara.receipt_id = eor.produced_receipt_id
      AND eo.receipt_id = eor.produced_receipt_id
      AND ara.action_kind = 'FUNCTION_CALL'
      AND COALESCE(ara.args::json->>'method_name', '') = 'on_transfer_with_reference'
      AND eo.status = 'SUCCESS_VALUE')
ORDER BY b.block_height DESC
LIMIT $3
"#;

/// Transfers carrying a given payment reference, with their confirmation count.
///
/// Binds:
/// * `$1` - receiver account of the transaction (`Text`)
/// * `$2` - address supplied by the caller (`Text`). It is matched against the
///   transaction receiver as well, not against the signer.
/// * `$3` - payment reference as stored, `0x` prefix included (`Text`)
/// * `$4` - search window in blocks, counted back from the chain tip (`BigInt`)
/// * `$5` - maximum number of rows (`BigInt`)
pub const TRANSFERS_BY_REFERENCE_QUERY: &str = r#"
SELECT t.transaction_hash,
       b.block_height::BIGINT AS block_height,
       t.block_timestamp::BIGINT AS block_timestamp,
       t.signer_account_id AS payer,
       r.receiver_account_id AS payee,
       COALESCE(a.args::json->>'deposit', '') AS deposit,
       COALESCE(a.args::json->>'method_name', '') AS method_name,
       COALESCE((a.args::json->'args_json')::json->>'to', '') AS "to",
       COALESCE((a.args::json->'args_json')::json->>'amount', '') AS amount,
       (a.args::json->'args_json')::json->>'payment_reference' AS payment_reference,
       ((SELECT MAX(block_height) FROM blocks) - b.block_height)::BIGINT AS confirmations
FROM transactions t
INNER JOIN transaction_actions a ON (a.transaction_hash = t.transaction_hash)
INNER JOIN receipts r ON (r.originated_from_transaction_hash = t.transaction_hash)
INNER JOIN blocks b ON (b.block_timestamp = r.included_in_block_timestamp)
INNER JOIN execution_outcomes e ON (e.receipt_id = r.receipt_id)
INNER JOIN action_receipt_actions ra ON (ra.receipt_id = r.receipt_id)
WHERE t.receiver_account_id = $2
  AND r.predecessor_account_id != 'system'
  AND a.action_kind = 'FUNCTION_CALL'
  AND e.status = 'SUCCESS_VALUE'
  AND t.receiver_account_id = $1
  AND b.block_height >= (SELECT MAX(block_height) FROM blocks) - $4
  AND (a.args::json->'args_json')::json->>'payment_reference' = $3
  AND ra.action_kind = 'TRANSFER'
ORDER BY b.block_height DESC
LIMIT $5
"#;

/// Highest block height known to the indexer, `NULL` on an empty `blocks` table.
pub const CHAIN_TIP_QUERY: &str = "SELECT MAX(block_height)::BIGINT AS block_height FROM blocks";
