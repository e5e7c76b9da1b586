use diesel::{
    sql_types::{BigInt, Nullable},
    QueryableByName,
};
use diesel_async::RunQueryDsl;

use crate::{queries::CHAIN_TIP_QUERY, DbConnection};

/// Height of the most recent block the indexer has stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, QueryableByName)]
pub struct ChainTip {
    #[diesel(sql_type = Nullable<BigInt>)]
    pub block_height: Option<i64>,
}

impl ChainTip {
    pub async fn get<'a>(conn: &mut DbConnection<'a>) -> Result<Self, diesel::result::Error> {
        diesel::sql_query(CHAIN_TIP_QUERY).get_result(conn).await
    }
}
