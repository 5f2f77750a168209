pub mod market_data_errors;
pub mod market_data_model;
pub mod price_resolver;
pub mod providers;
pub mod quote_cache;

#[cfg(test)]
mod price_resolver_tests;

pub use market_data_errors::MarketDataError;
pub use market_data_model::PriceQuote;
pub use price_resolver::{resolve_price, PriceIndex, PriceResolver};
pub use providers::{CoinGeckoProvider, MarketDataProvider};
pub use quote_cache::QuoteCache;
