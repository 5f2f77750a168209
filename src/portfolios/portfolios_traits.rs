use super::portfolios_model::{NewPortfolio, Portfolio};
use crate::errors::Result;

/// Trait defining the contract for portfolio repository operations.
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn create(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn find_for_user(&self, user_id: &str, portfolio_id: i64) -> Result<Option<Portfolio>>;
}
