use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use super::portfolios_model::{NewPortfolio, NewPortfolioDB, Portfolio, PortfolioDB};
use super::portfolios_traits::PortfolioRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::portfolios;

/// Repository for managing portfolio data in the database
pub struct PortfolioRepository {
    pool: Arc<DbPool>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    fn create(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate()?;
        let mut conn = get_connection(&self.pool)?;

        let row = NewPortfolioDB {
            user_id: user_id.to_string(),
            name: new_portfolio.name,
            currency: new_portfolio.currency,
            created_at: Utc::now().to_rfc3339(),
        };

        let inserted: PortfolioDB = diesel::insert_into(portfolios::table)
            .values(&row)
            .returning(PortfolioDB::as_returning())
            .get_result(&mut conn)?;

        Ok(Portfolio::from(inserted))
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = portfolios::table
            .filter(portfolios::user_id.eq(user_id))
            .order(portfolios::id.asc())
            .select(PortfolioDB::as_select())
            .load::<PortfolioDB>(&mut conn)?;

        Ok(rows.into_iter().map(Portfolio::from).collect())
    }

    fn find_for_user(&self, user_id: &str, portfolio_id: i64) -> Result<Option<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        let row = portfolios::table
            .filter(portfolios::id.eq(portfolio_id))
            .filter(portfolios::user_id.eq(user_id))
            .select(PortfolioDB::as_select())
            .first::<PortfolioDB>(&mut conn)
            .optional()?;

        Ok(row.map(Portfolio::from))
    }
}
