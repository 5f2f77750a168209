use super::valuation_model::{HoldingView, MonthlyBreakdown, PortfolioStats, ValuationPoint};
use crate::auth::AuthContext;
use crate::errors::Result;

/// Query surface consumed by presentation layers.
///
/// Read paths never fail for missing identity or missing prices: an
/// anonymous context yields empty results, and price gaps degrade through
/// the resolver tiers.
#[async_trait::async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    async fn get_holdings(
        &self,
        auth: &AuthContext,
        portfolio_id: Option<i64>,
    ) -> Result<Vec<HoldingView>>;

    async fn get_stats(
        &self,
        auth: &AuthContext,
        portfolio_id: Option<i64>,
    ) -> Result<PortfolioStats>;

    async fn get_history(
        &self,
        auth: &AuthContext,
        portfolio_id: Option<i64>,
        days: u32,
    ) -> Result<Vec<ValuationPoint>>;

    async fn get_monthly_net_worth(
        &self,
        auth: &AuthContext,
        months: u32,
    ) -> Result<Vec<MonthlyBreakdown>>;
}
