//! Read-side definitions for the NEAR Indexer for Explorer database.
//!
//! The indexer schema is owned by the NEAR indexer itself, so instead of diesel
//! `table!` definitions this crate carries the raw SQL of the lookups we run
//! against it, together with the `QueryableByName` rows they produce.

use diesel_async::{pooled_connection::bb8::PooledConnection, AsyncPgConnection};

pub mod models;
pub mod queries;

pub type DbPool = diesel_async::pooled_connection::bb8::Pool<AsyncPgConnection>;
pub type DbConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Account used by the protocol for synthetic receipts (gas refunds, rewards).
pub const SYSTEM_ACCOUNT_ID: &str = "system";

/// Method the payment contract calls on itself once a transfer went through.
pub const TRANSFER_CALLBACK_METHOD: &str = "on_transfer_with_reference";
