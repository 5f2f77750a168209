pub mod coingecko_provider;
pub mod market_data_provider;

pub use coingecko_provider::CoinGeckoProvider;
pub use market_data_provider::MarketDataProvider;
