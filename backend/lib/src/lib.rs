//! NEAR Payments Backend Library
//!
//! Looks up payments made through a NEAR payment contract, straight from the
//! PostgreSQL database of a NEAR Indexer for Explorer instance.

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod log;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use models::TransactionRecord;
pub use services::{transactions::TransactionQueryService, Services};
