use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::PriceQuote;

/// External market data capability.
///
/// A provider may return a subset of the requested ids; a missing id means
/// the provider has nothing for it, not an error.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn batch_quote(
        &self,
        ids: &HashSet<String>,
    ) -> Result<HashMap<String, PriceQuote>, MarketDataError>;
}
