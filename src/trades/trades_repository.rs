use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::trades_model::{NewTradeDB, Trade, TradeDB};
use super::trades_traits::TradeRepositoryTrait;
use crate::constants::DATE_FORMAT;
use crate::db::{get_connection, DbConnection, DbPool};
use crate::errors::Result;
use crate::schema::trades;

/// Repository for the append-only trade ledger
pub struct TradeRepository {
    pool: Arc<DbPool>,
}

impl TradeRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl TradeRepositoryTrait for TradeRepository {
    fn append_with_conn(&self, conn: &mut DbConnection, row: NewTradeDB) -> Result<Trade> {
        let inserted: TradeDB = diesel::insert_into(trades::table)
            .values(&row)
            .returning(TradeDB::as_returning())
            .get_result(conn)?;

        Ok(Trade::from(inserted))
    }

    fn list_trades(
        &self,
        user_id: &str,
        portfolio_id: Option<i64>,
        date_upper_bound: Option<NaiveDate>,
    ) -> Result<Vec<Trade>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = trades::table
            .filter(trades::user_id.eq(user_id))
            .into_boxed();

        if let Some(pf_id) = portfolio_id {
            query = query.filter(trades::portfolio_id.eq(pf_id));
        }
        if let Some(bound) = date_upper_bound {
            // trade_date is stored as YYYY-MM-DD, so lexicographic order is
            // calendar order
            query = query.filter(trades::trade_date.le(bound.format(DATE_FORMAT).to_string()));
        }

        let rows = query
            .order((trades::trade_date.asc(), trades::id.asc()))
            .select(TradeDB::as_select())
            .load::<TradeDB>(&mut conn)?;

        Ok(rows.into_iter().map(Trade::from).collect())
    }
}
