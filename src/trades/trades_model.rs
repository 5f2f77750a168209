use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DATE_FORMAT;
use crate::db::{parse_date_text, parse_decimal_text};
use crate::trades::trades_errors::{Result, TradeError};

/// Kind of trade event in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    /// Marks cost basis and last price to a new value without a quantity change
    Revaluation,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Revaluation => "revaluation",
        }
    }
}

impl FromStr for TradeAction {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            "revaluation" => Ok(TradeAction::Revaluation),
            other => Err(TradeError::InvalidData(format!(
                "Unknown trade action '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset class of a traded instrument. Valuation splits by this recorded
/// value, never by symbol heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Crypto,
    Stock,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Crypto => "crypto",
            AssetKind::Stock => "stock",
        }
    }
}

impl FromStr for AssetKind {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "crypto" => Ok(AssetKind::Crypto),
            "stock" => Ok(AssetKind::Stock),
            other => Err(TradeError::InvalidData(format!(
                "Unknown asset kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model for one immutable ledger event.
///
/// `id` is assigned by the store at append time and doubles as the insertion
/// sequence: ledger order is `(trade_date ASC, id ASC)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub user_id: String,
    pub portfolio_id: i64,
    pub action: TradeAction,
    pub asset_kind: AssetKind,
    pub symbol: String,
    pub display_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fee: Decimal,
    pub total_value: Decimal,
    pub trade_date: NaiveDate,
    pub external_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database model for trades
#[derive(Queryable, Selectable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeDB {
    pub id: i64,
    pub user_id: String,
    pub portfolio_id: i64,
    pub action: String,
    pub asset_kind: String,
    pub symbol: String,
    pub display_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub fee: Option<String>,
    pub total_value: String,
    pub trade_date: String,
    pub external_price_id: Option<String>,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::trades)]
pub struct NewTradeDB {
    pub user_id: String,
    pub portfolio_id: i64,
    pub action: String,
    pub asset_kind: String,
    pub symbol: String,
    pub display_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub fee: Option<String>,
    pub total_value: String,
    pub trade_date: String,
    pub external_price_id: Option<String>,
    pub created_at: String,
}

impl From<TradeDB> for Trade {
    fn from(db: TradeDB) -> Self {
        let action = TradeAction::from_str(&db.action).unwrap_or_else(|_| {
            log::error!("Unknown action '{}' on trade {}", db.action, db.id);
            TradeAction::Buy
        });
        let asset_kind = AssetKind::from_str(&db.asset_kind).unwrap_or_else(|_| {
            log::error!("Unknown asset kind '{}' on trade {}", db.asset_kind, db.id);
            AssetKind::Stock
        });

        Trade {
            id: db.id,
            user_id: db.user_id,
            portfolio_id: db.portfolio_id,
            action,
            asset_kind,
            symbol: db.symbol,
            display_name: db.display_name,
            quantity: parse_decimal_text(&db.quantity, "trade quantity"),
            unit_price: parse_decimal_text(&db.unit_price, "trade unit_price"),
            fee: db
                .fee
                .as_deref()
                .map(|f| parse_decimal_text(f, "trade fee"))
                .unwrap_or(Decimal::ZERO),
            total_value: parse_decimal_text(&db.total_value, "trade total_value"),
            trade_date: parse_date_text(&db.trade_date, "trade trade_date"),
            external_price_id: db.external_price_id,
            created_at: DateTime::parse_from_rfc3339(&db.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}

/// Input model for appending a trade to the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub portfolio_id: i64,
    pub action: TradeAction,
    pub asset_kind: AssetKind,
    pub symbol: String,
    pub display_name: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fee: Option<Decimal>,
    pub trade_date: NaiveDate,
    pub external_price_id: Option<String>,
}

impl NewTrade {
    /// Validates the new trade data
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(TradeError::InvalidData(
                "Symbol cannot be empty".to_string(),
            ));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(TradeError::InvalidData(
                "Quantity must be greater than zero".to_string(),
            ));
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(TradeError::InvalidData(
                "Unit price must be greater than zero".to_string(),
            ));
        }
        if let Some(fee) = self.fee {
            if fee < Decimal::ZERO {
                return Err(TradeError::InvalidData(
                    "Fee cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn fee_or_zero(&self) -> Decimal {
        self.fee.unwrap_or(Decimal::ZERO)
    }

    /// Gross value of the trade including fee, persisted on the ledger row
    pub fn total_value(&self) -> Decimal {
        self.quantity * self.unit_price + self.fee_or_zero()
    }

    pub(crate) fn into_db_row(self, user_id: &str) -> NewTradeDB {
        let total_value = self.total_value();
        NewTradeDB {
            user_id: user_id.to_string(),
            portfolio_id: self.portfolio_id,
            action: self.action.as_str().to_string(),
            asset_kind: self.asset_kind.as_str().to_string(),
            symbol: self.symbol.clone(),
            display_name: self.display_name.unwrap_or(self.symbol),
            quantity: self.quantity.to_string(),
            unit_price: self.unit_price.to_string(),
            fee: self.fee.map(|f| f.to_string()),
            total_value: total_value.to_string(),
            trade_date: self.trade_date.format(DATE_FORMAT).to_string(),
            external_price_id: self.external_price_id,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
