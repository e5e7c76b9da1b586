//! Data module for the NEAR payments backend

pub mod indexer_db;
