pub mod db;

pub mod auth;
pub mod cash;
pub mod constants;
pub mod errors;
pub mod holdings;
pub mod market_data;
pub mod portfolios;
pub mod schema;
pub mod snapshot;
pub mod trades;
pub mod valuation;

pub use errors::{Error, Result};
pub use trades::*;
pub use valuation::*;
