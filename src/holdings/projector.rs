use log::warn;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::holdings_model::{Holding, HoldingKey};
use crate::trades::{Trade, TradeAction};

/// Result of applying one trade to a single position
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedPosition {
    Open(Holding),
    /// A sell consumed the full quantity; the position leaves the projection
    Closed,
}

/// Folds the trade ledger into per-position holdings state.
///
/// The projector never rejects a trade: ledgers are validated at write time,
/// so replay clamps instead of failing. A quantity that would go negative is
/// clamped to zero with a warning, and valuation continues.
#[derive(Default, Debug, Clone)]
pub struct HoldingsProjector {}

impl HoldingsProjector {
    pub fn new() -> Self {
        HoldingsProjector {}
    }

    /// Projects a ledger slice (already in `(trade_date, id)` order) into the
    /// holdings state after its last trade.
    pub fn project(&self, trades: &[Trade]) -> HashMap<HoldingKey, Holding> {
        let mut positions = HashMap::new();
        for trade in trades {
            self.apply_trade(&mut positions, trade);
        }
        positions
    }

    /// Advances a holdings state by one trade, in place.
    pub fn apply_trade(&self, positions: &mut HashMap<HoldingKey, Holding>, trade: &Trade) {
        let key = HoldingKey::of_trade(trade);
        match self.apply_to_position(positions.get(&key), trade) {
            AppliedPosition::Open(holding) => {
                positions.insert(key, holding);
            }
            AppliedPosition::Closed => {
                positions.remove(&key);
            }
        }
    }

    /// Applies one trade to one position and reports the resulting state.
    ///
    /// Accounting rules:
    /// - `buy` folds the fee into cost basis:
    ///   `avg = (q0 * avg0 + q * price + fee) / (q0 + q)`
    /// - `sell` keeps the average cost and only reduces quantity, clamped at
    ///   zero; selling down to exactly zero closes the position
    /// - `revaluation` sets both average cost and last price without a
    ///   quantity change; with no prior position it leaves a zero-quantity
    ///   price anchor
    pub fn apply_to_position(&self, current: Option<&Holding>, trade: &Trade) -> AppliedPosition {
        let mut holding = current.cloned().unwrap_or(Holding {
            display_name: trade.display_name.clone(),
            external_price_id: trade.external_price_id.clone(),
            quantity: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            last_price: trade.unit_price,
        });

        // Latest trade wins for display metadata and the provider id
        holding.display_name = trade.display_name.clone();
        if trade.external_price_id.is_some() {
            holding.external_price_id = trade.external_price_id.clone();
        }

        match trade.action {
            TradeAction::Buy => {
                let new_quantity = holding.quantity + trade.quantity;
                let total_cost =
                    holding.quantity * holding.average_cost + trade.quantity * trade.unit_price + trade.fee;
                holding.average_cost = if new_quantity > Decimal::ZERO {
                    total_cost / new_quantity
                } else {
                    trade.unit_price
                };
                holding.quantity = new_quantity;
                holding.last_price = trade.unit_price;
                AppliedPosition::Open(holding)
            }
            TradeAction::Sell => {
                if trade.quantity > holding.quantity {
                    warn!(
                        "Trade {} sells {} {} but only {} held; clamping to zero",
                        trade.id, trade.quantity, trade.symbol, holding.quantity
                    );
                }
                let new_quantity = (holding.quantity - trade.quantity).max(Decimal::ZERO);
                holding.quantity = new_quantity;
                holding.last_price = trade.unit_price;
                if new_quantity == Decimal::ZERO {
                    AppliedPosition::Closed
                } else {
                    AppliedPosition::Open(holding)
                }
            }
            TradeAction::Revaluation => {
                holding.average_cost = trade.unit_price;
                holding.last_price = trade.unit_price;
                AppliedPosition::Open(holding)
            }
        }
    }
}
