use async_trait::async_trait;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::market_data_provider::MarketDataProvider;
use crate::constants::PROVIDER_TIMEOUT_SECS;
use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::PriceQuote;

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Row of the `coins/markets` response; only the fields we consume
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

/// CoinGecko implementation of the market data capability.
///
/// One batched `coins/markets` call per request; missing or null fields
/// become zero rather than errors.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()?;

        Ok(CoinGeckoProvider {
            client,
            base_url: COINGECKO_API_URL.to_string(),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let mut provider = Self::new()?;
        provider.base_url = base_url.into();
        Ok(provider)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn batch_quote(
        &self,
        ids: &HashSet<String>,
    ) -> Result<HashMap<String, PriceQuote>, MarketDataError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut sorted_ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        sorted_ids.sort_unstable();
        let joined = sorted_ids.join(",");

        let url = format!(
            "{}/coins/markets?vs_currency=usd&ids={}&order=market_cap_desc&per_page=250&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url,
            urlencoding::encode(&joined)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError(format!(
                "coins/markets returned HTTP {}",
                response.status()
            )));
        }

        let rows: Vec<MarketRow> = response.json().await?;

        let mut quotes = HashMap::with_capacity(rows.len());
        for row in rows {
            let price = row
                .current_price
                .and_then(Decimal::from_f64)
                .unwrap_or(Decimal::ZERO);
            let change_24h_percent = row
                .price_change_percentage_24h
                .and_then(Decimal::from_f64)
                .unwrap_or(Decimal::ZERO);
            quotes.insert(
                row.id,
                PriceQuote {
                    price,
                    change_24h_percent,
                },
            );
        }

        Ok(quotes)
    }
}
