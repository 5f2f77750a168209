use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::market_data_model::PriceQuote;
use crate::constants::QUOTE_CACHE_TTL_SECS;

#[derive(Debug, Clone)]
struct CachedQuote {
    quote: PriceQuote,
    fetched_at: Instant,
}

/// Bounded-lifetime cache of live quotes, keyed by external price id.
///
/// Constructed once per process and shared by handle. Entries are written
/// whole; concurrent writers for the same id race last-writer-wins, which is
/// fine for idempotent price snapshots.
#[derive(Debug)]
pub struct QuoteCache {
    entries: DashMap<String, CachedQuote>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        QuoteCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, id: &str, now: Instant) -> Option<PriceQuote> {
        let entry = self.entries.get(id)?;
        if now.duration_since(entry.fetched_at) < self.ttl {
            Some(entry.quote.clone())
        } else {
            None
        }
    }

    pub fn put(&self, id: &str, quote: PriceQuote, now: Instant) {
        self.entries.insert(
            id.to_string(),
            CachedQuote {
                quote,
                fetched_at: now,
            },
        );
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        QuoteCache::new(Duration::from_secs(QUOTE_CACHE_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(price: rust_decimal::Decimal) -> PriceQuote {
        PriceQuote {
            price,
            change_24h_percent: dec!(0),
        }
    }

    #[test]
    fn entry_is_served_within_its_lifetime() {
        let cache = QuoteCache::new(Duration::from_secs(300));
        let t0 = Instant::now();

        cache.put("bitcoin", quote(dec!(50000)), t0);
        let hit = cache.get("bitcoin", t0 + Duration::from_secs(299));
        assert_eq!(hit.map(|q| q.price), Some(dec!(50000)));
    }

    #[test]
    fn entry_expires_after_its_lifetime() {
        let cache = QuoteCache::new(Duration::from_secs(300));
        let t0 = Instant::now();

        cache.put("bitcoin", quote(dec!(50000)), t0);
        assert!(cache.get("bitcoin", t0 + Duration::from_secs(300)).is_none());
    }

    #[test]
    fn rewriting_an_entry_refreshes_it() {
        let cache = QuoteCache::new(Duration::from_secs(300));
        let t0 = Instant::now();

        cache.put("bitcoin", quote(dec!(50000)), t0);
        cache.put("bitcoin", quote(dec!(51000)), t0 + Duration::from_secs(200));

        let hit = cache.get("bitcoin", t0 + Duration::from_secs(400));
        assert_eq!(hit.map(|q| q.price), Some(dec!(51000)));
    }

    #[test]
    fn unknown_id_misses() {
        let cache = QuoteCache::default();
        assert!(cache.get("unknown", Instant::now()).is_none());
    }
}
