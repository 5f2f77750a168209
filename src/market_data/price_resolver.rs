use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::{Decimal, MathematicalOps};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::market_data_model::PriceQuote;
use super::providers::MarketDataProvider;
use super::quote_cache::QuoteCache;
use crate::holdings::HoldingKey;
use crate::trades::Trade;

/// Per-position trade price lookups, built once per aggregation request
/// from the ledger slice being valued.
#[derive(Debug, Default)]
pub struct PriceIndex {
    // Entries per key are in ledger order, so dates are ascending
    by_key: HashMap<HoldingKey, Vec<(NaiveDate, Decimal)>>,
}

impl PriceIndex {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut by_key: HashMap<HoldingKey, Vec<(NaiveDate, Decimal)>> = HashMap::new();
        for trade in trades {
            by_key
                .entry(HoldingKey::of_trade(trade))
                .or_default()
                .push((trade.trade_date, trade.unit_price));
        }
        PriceIndex { by_key }
    }

    /// Price of the latest trade dated exactly `date`, if any.
    pub fn on_date(&self, key: &HoldingKey, date: NaiveDate) -> Option<Decimal> {
        let entries = self.by_key.get(key)?;
        let idx = entries.partition_point(|(d, _)| *d <= date);
        entries[..idx]
            .last()
            .filter(|(d, _)| *d == date)
            .map(|(_, price)| *price)
    }

    /// Price of the latest trade dated on or before `date`, if any.
    pub fn last_on_or_before(&self, key: &HoldingKey, date: NaiveDate) -> Option<Decimal> {
        let entries = self.by_key.get(key)?;
        let idx = entries.partition_point(|(d, _)| *d <= date);
        entries[..idx].last().map(|(_, price)| *price)
    }
}

/// Resolves a price for a position at an arbitrary date.
///
/// Tier order, first applicable wins:
/// 1. a trade on the exact date (ground truth)
/// 2. the latest trade on or before the date
/// 3. with both a last-known trade price and a live quote: a linear blend
///    `w * live + (1 - w) * last_known` with `w = 1 / (days_from_today + 1)`,
///    so the live quote dominates as the date approaches today and the last
///    trade price dominates deep in the past
/// 4. with only a live quote: back out the compound daily change,
///    `live / (1 + change_24h / 100)^days_ago`
/// 5. the position's average cost, else zero
///
/// Resolution never fails; tiers 3-5 are estimates, not ground truth.
/// `as_of == today` with a live quote short-circuits to the quote.
pub fn resolve_price(
    key: &HoldingKey,
    as_of: NaiveDate,
    today: NaiveDate,
    index: &PriceIndex,
    live: Option<&PriceQuote>,
    average_cost: Decimal,
) -> Decimal {
    if let Some(price) = index.on_date(key, as_of) {
        return price;
    }

    let last_known = index
        .last_on_or_before(key, as_of)
        .filter(|p| *p > Decimal::ZERO);
    let days_ago = (today - as_of).num_days().max(0);

    if let Some(quote) = live.filter(|q| q.price > Decimal::ZERO) {
        if days_ago == 0 {
            return quote.price;
        }

        if let Some(base) = last_known {
            let weight = Decimal::ONE / (Decimal::from(days_ago) + Decimal::ONE);
            return quote.price * weight + base * (Decimal::ONE - weight);
        }

        let rate = quote.change_24h_percent / Decimal::ONE_HUNDRED;
        let growth = Decimal::ONE + rate;
        if !rate.is_zero() && growth > Decimal::ZERO {
            if let Some(compounded) = growth.checked_powi(days_ago) {
                if compounded > Decimal::ZERO {
                    return quote.price / compounded;
                }
            }
        }
        return quote.price;
    }

    if let Some(base) = last_known {
        return base;
    }

    if average_cost > Decimal::ZERO {
        debug!(
            "No trade or live price for {}/{:?} on {}; falling back to average cost",
            key.symbol, key.asset_kind, as_of
        );
        return average_cost;
    }

    Decimal::ZERO
}

/// Wraps the market data provider with the quote cache.
///
/// Shared across requests; the cache is its only state.
pub struct PriceResolver {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<QuoteCache>,
}

impl PriceResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: Arc<QuoteCache>) -> Self {
        PriceResolver { provider, cache }
    }

    /// Live quotes for the given external price ids.
    ///
    /// Cache misses are batched into a single provider call. A provider
    /// failure degrades to whatever the cache already had; it never
    /// propagates, so valuation always gets an answer.
    pub async fn live_quotes(&self, ids: &HashSet<String>) -> HashMap<String, PriceQuote> {
        let now = Instant::now();
        let mut quotes = HashMap::new();
        let mut missing: HashSet<String> = HashSet::new();

        for id in ids {
            match self.cache.get(id, now) {
                Some(quote) => {
                    quotes.insert(id.clone(), quote);
                }
                None => {
                    missing.insert(id.clone());
                }
            }
        }

        if !missing.is_empty() {
            match self.provider.batch_quote(&missing).await {
                Ok(fetched) => {
                    for (id, quote) in fetched {
                        self.cache.put(&id, quote.clone(), now);
                        quotes.insert(id, quote);
                    }
                }
                Err(e) => {
                    warn!(
                        "Market data provider unavailable for {} ids: {}; valuing without live quotes",
                        missing.len(),
                        e
                    );
                }
            }
        }

        quotes
    }
}
