use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TradeError>;

/// Custom error type for trade ledger operations
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Portfolio {0} not found")]
    PortfolioNotFound(i64),

    #[error("Insufficient holdings to sell {requested} {symbol} (held: {held})")]
    InsufficientHoldings {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DieselError> for TradeError {
    fn from(err: DieselError) -> Self {
        TradeError::DatabaseError(err.to_string())
    }
}

impl From<TradeError> for String {
    fn from(error: TradeError) -> Self {
        error.to_string()
    }
}
