pub mod chain;
pub mod transfer;

pub use chain::*;
pub use transfer::*;
