use thiserror::Error;

/// Errors raised at the market data boundary.
///
/// None of these propagate out of valuation paths: the price resolver
/// catches them and degrades to its trade-price and cost-basis tiers.
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
