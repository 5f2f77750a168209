use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::trades_model::{NewTrade, Trade, TradeAction};
use super::trades_errors::TradeError;
use super::trades_traits::{TradeRepositoryTrait, TradeServiceTrait};
use crate::auth::AuthContext;
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::holdings::{AppliedPosition, HoldingKey, HoldingsProjector, HoldingsRepositoryTrait};
use crate::portfolios::PortfolioRepositoryTrait;

/// Service owning the sole write path into the trade ledger.
///
/// A write appends the immutable trade row and brings the persisted holdings
/// projection up to date in a single transaction; a failure in either rolls
/// back both.
pub struct TradeService {
    pool: Arc<DbPool>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    trade_repository: Arc<dyn TradeRepositoryTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    projector: HoldingsProjector,
}

impl TradeService {
    pub fn new(
        pool: Arc<DbPool>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        trade_repository: Arc<dyn TradeRepositoryTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            portfolio_repository,
            trade_repository,
            holdings_repository,
            projector: HoldingsProjector::new(),
        }
    }
}

#[async_trait::async_trait]
impl TradeServiceTrait for TradeService {
    async fn record_trade(&self, auth: &AuthContext, new_trade: NewTrade) -> Result<Trade> {
        let user_id = auth.user_id().ok_or(TradeError::Unauthorized)?.to_string();

        new_trade.validate()?;

        self.portfolio_repository
            .find_for_user(&user_id, new_trade.portfolio_id)?
            .ok_or(TradeError::PortfolioNotFound(new_trade.portfolio_id))?;

        let key = HoldingKey {
            portfolio_id: new_trade.portfolio_id,
            symbol: new_trade.symbol.clone(),
            asset_kind: new_trade.asset_kind,
        };
        let action = new_trade.action;
        let quantity = new_trade.quantity;
        let symbol = new_trade.symbol.clone();
        let row = new_trade.into_db_row(&user_id);

        self.pool.execute(|conn| -> Result<Trade> {
            let current = self
                .holdings_repository
                .find_by_key_with_conn(conn, &key)?
                .map(|record| record.to_holding());

            // The sell check runs against the current projection inside the
            // same transaction that appends, so no concurrent write can slip
            // a position out from under it.
            if action == TradeAction::Sell {
                let held = current
                    .as_ref()
                    .map(|h| h.quantity)
                    .unwrap_or(Decimal::ZERO);
                if quantity > held {
                    return Err(Error::Trade(TradeError::InsufficientHoldings {
                        symbol: symbol.clone(),
                        requested: quantity,
                        held,
                    }));
                }
            }

            let trade = self.trade_repository.append_with_conn(conn, row)?;
            debug!(
                "Appended trade {} ({} {} {} @ {})",
                trade.id, trade.action, trade.quantity, trade.symbol, trade.unit_price
            );

            match self.projector.apply_to_position(current.as_ref(), &trade) {
                AppliedPosition::Open(holding) => {
                    self.holdings_repository
                        .upsert_with_conn(conn, &key, &holding)?
                }
                AppliedPosition::Closed => self
                    .holdings_repository
                    .delete_by_key_with_conn(conn, &key)?,
            }

            Ok(trade)
        })
    }
}
