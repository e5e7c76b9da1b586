use diesel::{
    sql_types::{BigInt, Nullable, Text},
    QueryableByName,
};
use diesel_async::RunQueryDsl;

use crate::{
    queries::{RECENT_TRANSFERS_QUERY, TRANSFERS_BY_REFERENCE_QUERY},
    DbConnection,
};

/// Row produced by [`RECENT_TRANSFERS_QUERY`].
///
/// When `payer` equals `payee` the deposit went back to the signer, usually
/// because the `to` account of the call does not exist.
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName)]
pub struct RecentTransfer {
    #[diesel(sql_type = Text)]
    pub transaction_hash: String,
    #[diesel(sql_type = Text)]
    pub block_hash: String,
    #[diesel(sql_type = BigInt)]
    pub block_height: i64,
    // Nanoseconds since the unix epoch
    #[diesel(sql_type = BigInt)]
    pub block_timestamp: i64,
    #[diesel(sql_type = Text)]
    pub payer: String,
    #[diesel(sql_type = Text)]
    pub payee: String,
    #[diesel(sql_type = Text)]
    pub deposit: String,
    #[diesel(sql_type = Text)]
    pub method_name: String,
    #[diesel(sql_type = Text)]
    pub to: String,
    #[diesel(sql_type = Text)]
    pub amount: String,
    #[diesel(sql_type = Text)]
    pub payment_reference: String,
}

impl RecentTransfer {
    /// Transfers received by `receiver` within the last `depth_in_blocks` blocks, newest first.
    pub async fn get_for_receiver<'a>(
        conn: &mut DbConnection<'a>,
        receiver: &str,
        depth_in_blocks: i64,
        limit: i64,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        diesel::sql_query(RECENT_TRANSFERS_QUERY)
            .bind::<Text, _>(receiver)
            .bind::<BigInt, _>(depth_in_blocks)
            .bind::<BigInt, _>(limit)
            .load(conn)
            .await
    }
}

/// Row produced by [`TRANSFERS_BY_REFERENCE_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName)]
pub struct ReferencedTransfer {
    #[diesel(sql_type = Text)]
    pub transaction_hash: String,
    #[diesel(sql_type = BigInt)]
    pub block_height: i64,
    #[diesel(sql_type = BigInt)]
    pub block_timestamp: i64,
    #[diesel(sql_type = Text)]
    pub payer: String,
    #[diesel(sql_type = Text)]
    pub payee: String,
    #[diesel(sql_type = Text)]
    pub deposit: String,
    #[diesel(sql_type = Text)]
    pub method_name: String,
    #[diesel(sql_type = Text)]
    pub to: String,
    #[diesel(sql_type = Text)]
    pub amount: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub payment_reference: Option<String>,
    // Blocks stored on top of the one including this transfer
    #[diesel(sql_type = BigInt)]
    pub confirmations: i64,
}

impl ReferencedTransfer {
    /// Transfers whose call arguments carry exactly `payment_reference`.
    ///
    /// `payment_reference` must be given in its stored form, `0x` prefix included.
    pub async fn get_by_reference<'a>(
        conn: &mut DbConnection<'a>,
        receiver: &str,
        address: &str,
        payment_reference: &str,
        window_in_blocks: i64,
        limit: i64,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        diesel::sql_query(TRANSFERS_BY_REFERENCE_QUERY)
            .bind::<Text, _>(receiver)
            .bind::<Text, _>(address)
            .bind::<Text, _>(payment_reference)
            .bind::<BigInt, _>(window_in_blocks)
            .bind::<BigInt, _>(limit)
            .load(conn)
            .await
    }
}
