use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::db::parse_decimal_text;
use crate::trades::{AssetKind, Trade};

/// Composite identity of a position: one per (portfolio, symbol, asset kind).
///
/// A value type rather than a joined string, so symbols containing separator
/// characters can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingKey {
    pub portfolio_id: i64,
    pub symbol: String,
    pub asset_kind: AssetKind,
}

impl HoldingKey {
    pub fn of_trade(trade: &Trade) -> Self {
        HoldingKey {
            portfolio_id: trade.portfolio_id,
            symbol: trade.symbol.clone(),
            asset_kind: trade.asset_kind,
        }
    }
}

/// Projected state of one position.
///
/// Derived data: always rebuildable by replaying the trade ledger. A
/// zero-quantity holding is a price anchor left by a revaluation; it
/// contributes nothing to market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub display_name: String,
    pub external_price_id: Option<String>,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub last_price: Decimal,
}

impl Holding {
    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.average_cost
    }
}

/// Persisted current-state projection row, kept in sync on every trade write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRecord {
    pub id: String,
    pub portfolio_id: i64,
    pub asset_kind: AssetKind,
    pub symbol: String,
    pub display_name: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub last_price: Decimal,
    pub external_price_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl HoldingRecord {
    pub fn key(&self) -> HoldingKey {
        HoldingKey {
            portfolio_id: self.portfolio_id,
            symbol: self.symbol.clone(),
            asset_kind: self.asset_kind,
        }
    }

    pub fn to_holding(&self) -> Holding {
        Holding {
            display_name: self.display_name.clone(),
            external_price_id: self.external_price_id.clone(),
            quantity: self.quantity,
            average_cost: self.average_cost,
            last_price: self.last_price,
        }
    }
}

/// Database model for holdings
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDB {
    pub id: String,
    pub portfolio_id: i64,
    pub asset_kind: String,
    pub symbol: String,
    pub display_name: String,
    pub quantity: String,
    pub average_cost: String,
    pub last_price: String,
    pub external_price_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<HoldingDB> for HoldingRecord {
    fn from(db: HoldingDB) -> Self {
        let asset_kind = AssetKind::from_str(&db.asset_kind).unwrap_or_else(|_| {
            log::error!("Unknown asset kind '{}' on holding {}", db.asset_kind, db.id);
            AssetKind::Stock
        });

        HoldingRecord {
            id: db.id,
            portfolio_id: db.portfolio_id,
            asset_kind,
            symbol: db.symbol,
            display_name: db.display_name,
            quantity: parse_decimal_text(&db.quantity, "holding quantity"),
            average_cost: parse_decimal_text(&db.average_cost, "holding average_cost"),
            last_price: parse_decimal_text(&db.last_price, "holding last_price"),
            external_price_id: db.external_price_id,
            updated_at: DateTime::parse_from_rfc3339(&db.updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}
