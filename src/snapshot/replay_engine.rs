use chrono::{Datelike, Days, Months, NaiveDate};
use log::debug;
use std::collections::HashMap;

use crate::constants::MAX_HISTORY_DAYS;
use crate::holdings::{Holding, HoldingKey, HoldingsProjector};
use crate::trades::Trade;

/// Reconstructs historical holdings state by replaying ledger prefixes.
///
/// `series_over` advances one mutable holdings state trade-by-trade and takes
/// a defensive copy at each requested date boundary, so a window costs
/// O(trades + dates) instead of a full re-scan per date. The result for any
/// date is identical to projecting the prefix from scratch.
#[derive(Default, Debug, Clone)]
pub struct ReplayEngine {
    projector: HoldingsProjector,
}

impl ReplayEngine {
    pub fn new() -> Self {
        ReplayEngine {
            projector: HoldingsProjector::new(),
        }
    }

    /// Holdings state after all trades dated on or before `cutoff`.
    ///
    /// `trades` must already be in ledger order `(trade_date, id)`.
    pub fn snapshot_at(&self, trades: &[Trade], cutoff: NaiveDate) -> HashMap<HoldingKey, Holding> {
        let mut positions = HashMap::new();
        for trade in trades {
            if trade.trade_date > cutoff {
                break;
            }
            self.projector.apply_trade(&mut positions, trade);
        }
        positions
    }

    /// One snapshot per requested date, produced by a single forward fold.
    ///
    /// `dates` must be ascending; `trades` must be in ledger order.
    pub fn series_over(
        &self,
        trades: &[Trade],
        dates: &[NaiveDate],
    ) -> Vec<(NaiveDate, HashMap<HoldingKey, Holding>)> {
        debug!(
            "Replaying {} trades over {} snapshot dates",
            trades.len(),
            dates.len()
        );

        let mut series = Vec::with_capacity(dates.len());
        let mut positions: HashMap<HoldingKey, Holding> = HashMap::new();
        let mut next = 0usize;

        for &date in dates {
            while next < trades.len() && trades[next].trade_date <= date {
                self.projector.apply_trade(&mut positions, &trades[next]);
                next += 1;
            }
            series.push((date, positions.clone()));
        }

        series
    }
}

/// The `days + 1` calendar dates ending at `today`, capped at a year.
pub fn day_range(days: u32, today: NaiveDate) -> Vec<NaiveDate> {
    let days = days.min(MAX_HISTORY_DAYS) as u64;
    (0..=days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

/// The last calendar day of each of the trailing `months` months, the
/// current month included.
pub fn month_ends(months: u32, today: NaiveDate) -> Vec<NaiveDate> {
    let months = months.max(1);
    (0..months)
        .rev()
        .filter_map(|back| {
            today
                .checked_sub_months(Months::new(back))
                .map(|d| end_of_month(d.year(), d.month()))
        })
        .collect()
}

/// Last day of the given month.
pub fn end_of_month(year: i32, month: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(first)
}
