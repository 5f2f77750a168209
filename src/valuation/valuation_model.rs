use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trades::AssetKind;

/// One enriched holdings row for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    pub id: String,
    pub portfolio_id: i64,
    pub asset_kind: AssetKind,
    pub symbol: String,
    pub display_name: String,
    pub quantity: Decimal,
    pub current_price: Decimal,
    pub change_24h_percent: Decimal,
    pub daily_pl: Decimal,
    pub average_cost: Decimal,
    pub invested: Decimal,
    pub market_value: Decimal,
    pub unrealized_pl: Decimal,
    /// Share of total portfolio value, in percent; 0 when the total is 0
    pub allocation: Decimal,
}

/// Summary card figures for one portfolio or all of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_value: Decimal,
    pub daily_pl: Decimal,
    pub daily_pl_percent: Decimal,
    pub unrealized_pl: Decimal,
    pub unrealized_pl_percent: Decimal,
}

/// One point of the daily portfolio value series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub date: NaiveDate,
    pub total_value: Decimal,
}

/// Month-end net worth split by asset class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub year: i32,
    pub month: u32,
    pub cash: Decimal,
    pub stocks: Decimal,
    pub crypto: Decimal,
    pub total: Decimal,
}
