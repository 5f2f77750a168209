use chrono::{NaiveDate, Utc};
use log::warn;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::valuation_calculator::{
    build_holding_views, history_points, monthly_breakdowns, stats_from_views,
};
use super::valuation_model::{HoldingView, MonthlyBreakdown, PortfolioStats, ValuationPoint};
use super::valuation_traits::ValuationServiceTrait;
use crate::auth::AuthContext;
use crate::cash::CashLedgerTrait;
use crate::errors::Result;
use crate::holdings::{HoldingRecord, HoldingsRepositoryTrait};
use crate::market_data::{PriceQuote, PriceResolver};
use crate::snapshot::{day_range, month_ends};
use crate::trades::TradeRepositoryTrait;

/// Aggregates replayed holdings, resolved prices and the external cash
/// balance into the outward query surface.
pub struct ValuationService {
    trade_repository: Arc<dyn TradeRepositoryTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    price_resolver: Arc<PriceResolver>,
    cash_ledger: Arc<dyn CashLedgerTrait>,
}

impl ValuationService {
    pub fn new(
        trade_repository: Arc<dyn TradeRepositoryTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        price_resolver: Arc<PriceResolver>,
        cash_ledger: Arc<dyn CashLedgerTrait>,
    ) -> Self {
        Self {
            trade_repository,
            holdings_repository,
            price_resolver,
            cash_ledger,
        }
    }

    fn external_price_ids(records: &[HoldingRecord]) -> HashSet<String> {
        records
            .iter()
            .filter_map(|r| r.external_price_id.clone())
            .collect()
    }

    async fn quotes_for(&self, records: &[HoldingRecord]) -> HashMap<String, PriceQuote> {
        self.price_resolver
            .live_quotes(&Self::external_price_ids(records))
            .await
    }
}

#[async_trait::async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn get_holdings(
        &self,
        auth: &AuthContext,
        portfolio_id: Option<i64>,
    ) -> Result<Vec<HoldingView>> {
        let Some(user_id) = auth.user_id() else {
            return Ok(Vec::new());
        };

        let records = self.holdings_repository.get_for_user(user_id, portfolio_id)?;
        let quotes = self.quotes_for(&records).await;

        Ok(build_holding_views(&records, &quotes))
    }

    async fn get_stats(
        &self,
        auth: &AuthContext,
        portfolio_id: Option<i64>,
    ) -> Result<PortfolioStats> {
        let views = self.get_holdings(auth, portfolio_id).await?;
        Ok(stats_from_views(&views))
    }

    async fn get_history(
        &self,
        auth: &AuthContext,
        portfolio_id: Option<i64>,
        days: u32,
    ) -> Result<Vec<ValuationPoint>> {
        let Some(user_id) = auth.user_id() else {
            return Ok(Vec::new());
        };

        let today = Utc::now().date_naive();
        let trades = self
            .trade_repository
            .list_trades(user_id, portfolio_id, Some(today))?;
        let records = self.holdings_repository.get_for_user(user_id, portfolio_id)?;
        let quotes = self.quotes_for(&records).await;
        let dates = day_range(days, today);

        Ok(history_points(&trades, &records, &quotes, &dates, today))
    }

    async fn get_monthly_net_worth(
        &self,
        auth: &AuthContext,
        months: u32,
    ) -> Result<Vec<MonthlyBreakdown>> {
        let Some(user_id) = auth.user_id() else {
            return Ok(Vec::new());
        };

        let today = Utc::now().date_naive();
        let trades = self.trade_repository.list_trades(user_id, None, Some(today))?;
        let records = self.holdings_repository.get_for_user(user_id, None)?;
        let quotes = self.quotes_for(&records).await;

        let cash_by_month_end: Vec<(NaiveDate, Decimal)> = month_ends(months, today)
            .into_iter()
            .map(|month_end| {
                let cash = self
                    .cash_ledger
                    .balance_as_of(month_end)
                    .unwrap_or_else(|e| {
                        warn!("Cash ledger unavailable for {}: {}; using zero", month_end, e);
                        Decimal::ZERO
                    });
                (month_end, cash)
            })
            .collect();

        Ok(monthly_breakdowns(
            &trades,
            &records,
            &quotes,
            &cash_by_month_end,
            today,
        ))
    }
}
