use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::holdings::HoldingKey;
use crate::market_data::{
    resolve_price, MarketDataError, MarketDataProvider, PriceIndex, PriceQuote, PriceResolver,
    QuoteCache,
};
use crate::trades::{AssetKind, Trade, TradeAction};

fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

fn trade(id: i64, symbol: &str, unit_price: Decimal, date_str: &str) -> Trade {
    Trade {
        id,
        user_id: "user-1".to_string(),
        portfolio_id: 1,
        action: TradeAction::Buy,
        asset_kind: AssetKind::Crypto,
        symbol: symbol.to_string(),
        display_name: symbol.to_string(),
        quantity: dec!(1),
        unit_price,
        fee: Decimal::ZERO,
        total_value: unit_price,
        trade_date: date(date_str),
        external_price_id: Some(symbol.to_lowercase()),
        created_at: chrono::Utc::now(),
    }
}

fn key(symbol: &str) -> HoldingKey {
    HoldingKey {
        portfolio_id: 1,
        symbol: symbol.to_string(),
        asset_kind: AssetKind::Crypto,
    }
}

fn quote(price: Decimal, change: Decimal) -> PriceQuote {
    PriceQuote {
        price,
        change_24h_percent: change,
    }
}

#[test]
fn exact_date_trade_price_is_ground_truth() {
    let trades = vec![
        trade(1, "BTC", dec!(100), "2025-01-01"),
        trade(2, "BTC", dec!(110), "2025-01-05"),
    ];
    let index = PriceIndex::from_trades(&trades);
    let live = quote(dec!(500), dec!(1));

    // A live quote must not override an observed trade price
    let price = resolve_price(
        &key("BTC"),
        date("2025-01-05"),
        date("2025-01-20"),
        &index,
        Some(&live),
        dec!(100),
    );
    assert_eq!(price, dec!(110));
}

#[test]
fn same_day_trades_resolve_to_the_latest_one() {
    let trades = vec![
        trade(1, "BTC", dec!(100), "2025-01-05"),
        trade(2, "BTC", dec!(104), "2025-01-05"),
    ];
    let index = PriceIndex::from_trades(&trades);

    let price = resolve_price(
        &key("BTC"),
        date("2025-01-05"),
        date("2025-01-20"),
        &index,
        None,
        Decimal::ZERO,
    );
    assert_eq!(price, dec!(104));
}

#[test]
fn falls_back_to_last_known_trade_price_without_live_quote() {
    let trades = vec![trade(1, "BTC", dec!(100), "2025-01-01")];
    let index = PriceIndex::from_trades(&trades);

    let price = resolve_price(
        &key("BTC"),
        date("2025-01-10"),
        date("2025-01-20"),
        &index,
        None,
        dec!(80),
    );
    assert_eq!(price, dec!(100));

    // A trade after the as-of date must not leak backwards
    let before_first = resolve_price(
        &key("BTC"),
        date("2024-12-15"),
        date("2025-01-20"),
        &index,
        None,
        dec!(80),
    );
    assert_eq!(before_first, dec!(80));
}

#[test]
fn blends_last_known_and_live_price_toward_today() {
    let trades = vec![trade(1, "BTC", dec!(100), "2025-01-01")];
    let index = PriceIndex::from_trades(&trades);
    let live = quote(dec!(200), dec!(0));
    let today = date("2025-01-20");

    // One day back: w = 1/2 -> midpoint
    let one_back = resolve_price(&key("BTC"), date("2025-01-19"), today, &index, Some(&live), dec!(0));
    assert_eq!(one_back, dec!(150));

    // Three days back: w = 1/4 -> 200*0.25 + 100*0.75
    let three_back = resolve_price(&key("BTC"), date("2025-01-17"), today, &index, Some(&live), dec!(0));
    assert_eq!(three_back, dec!(125));

    // Weight on the live quote decays monotonically with distance
    let ten_back = resolve_price(&key("BTC"), date("2025-01-10"), today, &index, Some(&live), dec!(0));
    assert!(ten_back < three_back && three_back < one_back);
}

#[test]
fn today_resolves_to_the_live_quote_directly() {
    let trades = vec![trade(1, "BTC", dec!(100), "2025-01-01")];
    let index = PriceIndex::from_trades(&trades);
    let live = quote(dec!(200), dec!(5));
    let today = date("2025-01-20");

    let price = resolve_price(&key("BTC"), today, today, &index, Some(&live), dec!(0));
    assert_eq!(price, dec!(200));
}

#[test]
fn estimates_history_by_inverting_compound_daily_change() {
    // No trades at all: currentPrice=100, change24h=+10%, 1 day ago
    // -> 100 / 1.10
    let index = PriceIndex::from_trades(&[]);
    let live = quote(dec!(100), dec!(10));
    let today = date("2025-01-20");

    let one_day_ago = resolve_price(&key("BTC"), date("2025-01-19"), today, &index, Some(&live), dec!(0));
    let expected = dec!(100) / dec!(1.1);
    assert!((one_day_ago - expected).abs() < dec!(0.0001));

    let two_days_ago = resolve_price(&key("BTC"), date("2025-01-18"), today, &index, Some(&live), dec!(0));
    let expected2 = dec!(100) / (dec!(1.1) * dec!(1.1));
    assert!((two_days_ago - expected2).abs() < dec!(0.0001));
}

#[test]
fn flat_change_uses_live_price_unadjusted() {
    let index = PriceIndex::from_trades(&[]);
    let live = quote(dec!(100), dec!(0));

    let price = resolve_price(
        &key("BTC"),
        date("2025-01-10"),
        date("2025-01-20"),
        &index,
        Some(&live),
        dec!(0),
    );
    assert_eq!(price, dec!(100));
}

#[test]
fn total_loss_change_guards_the_compound_denominator() {
    let index = PriceIndex::from_trades(&[]);
    let live = quote(dec!(100), dec!(-100));

    let price = resolve_price(
        &key("BTC"),
        date("2025-01-10"),
        date("2025-01-20"),
        &index,
        Some(&live),
        dec!(0),
    );
    assert_eq!(price, dec!(100));
}

#[test]
fn final_fallback_is_average_cost_then_zero() {
    let index = PriceIndex::from_trades(&[]);
    let as_of = date("2025-01-10");
    let today = date("2025-01-20");

    assert_eq!(
        resolve_price(&key("BTC"), as_of, today, &index, None, dec!(42)),
        dec!(42)
    );
    assert_eq!(
        resolve_price(&key("BTC"), as_of, today, &index, None, Decimal::ZERO),
        Decimal::ZERO
    );
}

// --- PriceResolver cache and batching ---

struct CountingProvider {
    calls: AtomicUsize,
    quotes: HashMap<String, PriceQuote>,
    fail: bool,
}

impl CountingProvider {
    fn new(quotes: HashMap<String, PriceQuote>) -> Self {
        CountingProvider {
            calls: AtomicUsize::new(0),
            quotes,
            fail: false,
        }
    }

    fn failing() -> Self {
        CountingProvider {
            calls: AtomicUsize::new(0),
            quotes: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl MarketDataProvider for CountingProvider {
    async fn batch_quote(
        &self,
        ids: &HashSet<String>,
    ) -> Result<HashMap<String, PriceQuote>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MarketDataError::ProviderError("down".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.quotes.get(id).map(|q| (id.clone(), q.clone())))
            .collect())
    }
}

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn live_quotes_batches_misses_into_one_call_and_caches() {
    let mut quotes = HashMap::new();
    quotes.insert("bitcoin".to_string(), quote(dec!(50000), dec!(2)));
    quotes.insert("ethereum".to_string(), quote(dec!(3000), dec!(-1)));

    let provider = Arc::new(CountingProvider::new(quotes));
    let cache = Arc::new(QuoteCache::new(Duration::from_secs(300)));
    let resolver = PriceResolver::new(provider.clone(), cache);

    let first = resolver.live_quotes(&ids(&["bitcoin", "ethereum"])).await;
    assert_eq!(first.len(), 2);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // Second request inside the TTL is served from the cache
    let second = resolver.live_quotes(&ids(&["bitcoin", "ethereum"])).await;
    assert_eq!(second.len(), 2);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn provider_failure_yields_no_quotes_not_an_error() {
    let provider = Arc::new(CountingProvider::failing());
    let cache = Arc::new(QuoteCache::new(Duration::from_secs(300)));
    let resolver = PriceResolver::new(provider, cache);

    let quotes = resolver.live_quotes(&ids(&["bitcoin"])).await;
    assert!(quotes.is_empty());
}

#[tokio::test]
async fn provider_may_return_a_subset() {
    let mut known = HashMap::new();
    known.insert("bitcoin".to_string(), quote(dec!(50000), dec!(2)));

    let provider = Arc::new(CountingProvider::new(known));
    let cache = Arc::new(QuoteCache::new(Duration::from_secs(300)));
    let resolver = PriceResolver::new(provider, cache);

    let quotes = resolver.live_quotes(&ids(&["bitcoin", "unlisted-coin"])).await;
    assert_eq!(quotes.len(), 1);
    assert!(quotes.contains_key("bitcoin"));
}
