use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::valuation_model::{HoldingView, MonthlyBreakdown, PortfolioStats, ValuationPoint};
use crate::holdings::{Holding, HoldingKey, HoldingRecord};
use crate::market_data::{resolve_price, PriceIndex, PriceQuote};
use crate::snapshot::ReplayEngine;
use crate::trades::{AssetKind, Trade};

/// Builds the enriched holdings view from the persisted projection and live
/// quotes. Allocation is filled in a second pass once the total is known.
pub fn build_holding_views(
    records: &[HoldingRecord],
    quotes: &HashMap<String, PriceQuote>,
) -> Vec<HoldingView> {
    let mut views: Vec<HoldingView> = records
        .iter()
        .map(|record| {
            let quote = record
                .external_price_id
                .as_deref()
                .and_then(|id| quotes.get(id));

            let current_price = match quote {
                Some(q) if q.price > Decimal::ZERO => q.price,
                _ if record.last_price > Decimal::ZERO => record.last_price,
                _ => record.average_cost,
            };
            let change_24h_percent = quote
                .map(|q| q.change_24h_percent)
                .unwrap_or(Decimal::ZERO);

            let market_value = record.quantity * current_price;
            let invested = record.quantity * record.average_cost;

            HoldingView {
                id: record.id.clone(),
                portfolio_id: record.portfolio_id,
                asset_kind: record.asset_kind,
                symbol: record.symbol.clone(),
                display_name: record.display_name.clone(),
                quantity: record.quantity,
                current_price,
                change_24h_percent,
                daily_pl: daily_pl(market_value, change_24h_percent),
                average_cost: record.average_cost,
                invested,
                market_value,
                unrealized_pl: market_value - invested,
                allocation: Decimal::ZERO,
            }
        })
        .collect();

    let total_value: Decimal = views.iter().map(|v| v.market_value).sum();
    if total_value > Decimal::ZERO {
        for view in &mut views {
            view.allocation = view.market_value / total_value * Decimal::ONE_HUNDRED;
        }
    }

    views
}

/// Today's value change implied by a 24h percent change:
/// `previous = market_value / (1 + change/100)`, zero when that denominator
/// would be zero.
fn daily_pl(market_value: Decimal, change_24h_percent: Decimal) -> Decimal {
    let denominator = Decimal::ONE + change_24h_percent / Decimal::ONE_HUNDRED;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    market_value - market_value / denominator
}

/// Sums the holdings view into summary stats. Percent figures guard their
/// denominators; an empty view yields all zeros.
pub fn stats_from_views(views: &[HoldingView]) -> PortfolioStats {
    let total_value: Decimal = views.iter().map(|v| v.market_value).sum();
    let total_invested: Decimal = views.iter().map(|v| v.invested).sum();
    let daily_pl: Decimal = views.iter().map(|v| v.daily_pl).sum();
    let unrealized_pl: Decimal = views.iter().map(|v| v.unrealized_pl).sum();

    let daily_pl_percent = if total_value > Decimal::ZERO {
        daily_pl / total_value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let unrealized_pl_percent = if total_invested > Decimal::ZERO {
        unrealized_pl / total_invested * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    PortfolioStats {
        total_value,
        daily_pl,
        daily_pl_percent,
        unrealized_pl,
        unrealized_pl_percent,
    }
}

/// Current value of the persisted projection, used when a scope has no trade
/// history to replay.
fn current_value_of_records(
    records: &[HoldingRecord],
    quotes: &HashMap<String, PriceQuote>,
) -> Decimal {
    records
        .iter()
        .map(|record| {
            let price = record
                .external_price_id
                .as_deref()
                .and_then(|id| quotes.get(id))
                .map(|q| q.price)
                .filter(|p| *p > Decimal::ZERO)
                .unwrap_or(if record.last_price > Decimal::ZERO {
                    record.last_price
                } else {
                    record.average_cost
                });
            record.quantity * price
        })
        .sum()
}

fn live_quote_for<'q>(
    holding: &Holding,
    quotes: &'q HashMap<String, PriceQuote>,
) -> Option<&'q PriceQuote> {
    holding
        .external_price_id
        .as_deref()
        .and_then(|id| quotes.get(id))
}

/// Market value of one replayed snapshot at `as_of`, priced via the resolver
/// tiers. Zero-quantity anchors contribute nothing.
fn snapshot_value(
    positions: &HashMap<HoldingKey, Holding>,
    as_of: NaiveDate,
    today: NaiveDate,
    index: &PriceIndex,
    quotes: &HashMap<String, PriceQuote>,
) -> Decimal {
    positions
        .iter()
        .filter(|(_, holding)| holding.quantity > Decimal::ZERO)
        .map(|(key, holding)| {
            let price = resolve_price(
                key,
                as_of,
                today,
                index,
                live_quote_for(holding, quotes),
                holding.average_cost,
            );
            holding.quantity * price
        })
        .sum()
}

/// Daily portfolio value series over `dates`.
///
/// With an empty ledger every point carries the current projection value
/// unchanged: assets held before the window simply have no history to
/// replay.
pub fn history_points(
    trades: &[Trade],
    records: &[HoldingRecord],
    quotes: &HashMap<String, PriceQuote>,
    dates: &[NaiveDate],
    today: NaiveDate,
) -> Vec<ValuationPoint> {
    if trades.is_empty() {
        let current = current_value_of_records(records, quotes);
        return dates
            .iter()
            .map(|&date| ValuationPoint {
                date,
                total_value: current,
            })
            .collect();
    }

    let engine = ReplayEngine::new();
    let index = PriceIndex::from_trades(trades);

    engine
        .series_over(trades, dates)
        .into_iter()
        .map(|(date, positions)| ValuationPoint {
            date,
            total_value: snapshot_value(&positions, date, today, &index, quotes),
        })
        .collect()
}

/// Month-end net worth rows: replayed asset values split by recorded asset
/// kind, plus the externally supplied cash balance for each month end.
pub fn monthly_breakdowns(
    trades: &[Trade],
    records: &[HoldingRecord],
    quotes: &HashMap<String, PriceQuote>,
    cash_by_month_end: &[(NaiveDate, Decimal)],
    today: NaiveDate,
) -> Vec<MonthlyBreakdown> {
    let engine = ReplayEngine::new();
    let index = PriceIndex::from_trades(trades);

    let month_ends: Vec<NaiveDate> = cash_by_month_end.iter().map(|(d, _)| *d).collect();
    let series = if trades.is_empty() {
        Vec::new()
    } else {
        engine.series_over(trades, &month_ends)
    };

    cash_by_month_end
        .iter()
        .enumerate()
        .map(|(i, &(month_end, cash))| {
            let mut stocks = Decimal::ZERO;
            let mut crypto = Decimal::ZERO;

            if !trades.is_empty() {
                let (_, positions) = &series[i];
                for (key, holding) in positions.iter() {
                    if holding.quantity <= Decimal::ZERO {
                        continue;
                    }
                    let price = resolve_price(
                        key,
                        month_end.min(today),
                        today,
                        &index,
                        live_quote_for(holding, quotes),
                        holding.average_cost,
                    );
                    let value = holding.quantity * price;
                    match key.asset_kind {
                        AssetKind::Stock => stocks += value,
                        AssetKind::Crypto => crypto += value,
                    }
                }
            } else {
                // No history to replay: show the current projection value
                for record in records {
                    let quote = record
                        .external_price_id
                        .as_deref()
                        .and_then(|id| quotes.get(id));
                    let price = quote
                        .map(|q| q.price)
                        .filter(|p| *p > Decimal::ZERO)
                        .unwrap_or(if record.last_price > Decimal::ZERO {
                            record.last_price
                        } else {
                            record.average_cost
                        });
                    let value = record.quantity * price;
                    match record.asset_kind {
                        AssetKind::Stock => stocks += value,
                        AssetKind::Crypto => crypto += value,
                    }
                }
            }

            MonthlyBreakdown {
                year: month_end.year(),
                month: month_end.month(),
                cash,
                stocks,
                crypto,
                total: cash + stocks + crypto,
            }
        })
        .collect()
}
