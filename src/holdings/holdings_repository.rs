use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use super::holdings_model::{Holding, HoldingDB, HoldingKey, HoldingRecord};
use super::holdings_traits::HoldingsRepositoryTrait;
use crate::constants::DECIMAL_PRECISION;
use crate::db::{get_connection, DbConnection, DbPool};
use crate::errors::Result;
use crate::schema::{holdings, portfolios};

/// Repository for the persisted current-holdings projection
pub struct HoldingsRepository {
    pool: Arc<DbPool>,
}

impl HoldingsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn find_db_row(
        conn: &mut DbConnection,
        key: &HoldingKey,
    ) -> Result<Option<HoldingDB>> {
        let row = holdings::table
            .filter(holdings::portfolio_id.eq(key.portfolio_id))
            .filter(holdings::symbol.eq(&key.symbol))
            .filter(holdings::asset_kind.eq(key.asset_kind.as_str()))
            .select(HoldingDB::as_select())
            .first::<HoldingDB>(conn)
            .optional()?;
        Ok(row)
    }
}

impl HoldingsRepositoryTrait for HoldingsRepository {
    fn get_for_user(&self, user_id: &str, portfolio_id: Option<i64>) -> Result<Vec<HoldingRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = holdings::table
            .inner_join(portfolios::table.on(portfolios::id.eq(holdings::portfolio_id)))
            .filter(portfolios::user_id.eq(user_id))
            .into_boxed();

        if let Some(pf_id) = portfolio_id {
            query = query.filter(holdings::portfolio_id.eq(pf_id));
        }

        let rows = query
            .order((holdings::portfolio_id.asc(), holdings::symbol.asc()))
            .select(HoldingDB::as_select())
            .load::<HoldingDB>(&mut conn)?;

        Ok(rows.into_iter().map(HoldingRecord::from).collect())
    }

    fn find_by_key(&self, key: &HoldingKey) -> Result<Option<HoldingRecord>> {
        let mut conn = get_connection(&self.pool)?;
        self.find_by_key_with_conn(&mut conn, key)
    }

    fn find_by_key_with_conn(
        &self,
        conn: &mut DbConnection,
        key: &HoldingKey,
    ) -> Result<Option<HoldingRecord>> {
        Ok(Self::find_db_row(conn, key)?.map(HoldingRecord::from))
    }

    fn upsert_with_conn(
        &self,
        conn: &mut DbConnection,
        key: &HoldingKey,
        holding: &Holding,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        match Self::find_db_row(conn, key)? {
            Some(existing) => {
                diesel::update(holdings::table.filter(holdings::id.eq(&existing.id)))
                    .set((
                        holdings::display_name.eq(&holding.display_name),
                        holdings::quantity.eq(holding.quantity.round_dp(DECIMAL_PRECISION).to_string()),
                        holdings::average_cost
                            .eq(holding.average_cost.round_dp(DECIMAL_PRECISION).to_string()),
                        holdings::last_price
                            .eq(holding.last_price.round_dp(DECIMAL_PRECISION).to_string()),
                        holdings::external_price_id.eq(holding.external_price_id.clone()),
                        holdings::updated_at.eq(&now),
                    ))
                    .execute(conn)?;
            }
            None => {
                let row = HoldingDB {
                    id: Uuid::new_v4().to_string(),
                    portfolio_id: key.portfolio_id,
                    asset_kind: key.asset_kind.as_str().to_string(),
                    symbol: key.symbol.clone(),
                    display_name: holding.display_name.clone(),
                    quantity: holding.quantity.round_dp(DECIMAL_PRECISION).to_string(),
                    average_cost: holding.average_cost.round_dp(DECIMAL_PRECISION).to_string(),
                    last_price: holding.last_price.round_dp(DECIMAL_PRECISION).to_string(),
                    external_price_id: holding.external_price_id.clone(),
                    created_at: now.clone(),
                    updated_at: now,
                };
                diesel::insert_into(holdings::table)
                    .values(&row)
                    .execute(conn)?;
            }
        }

        Ok(())
    }

    fn delete_by_key_with_conn(&self, conn: &mut DbConnection, key: &HoldingKey) -> Result<()> {
        diesel::delete(
            holdings::table
                .filter(holdings::portfolio_id.eq(key.portfolio_id))
                .filter(holdings::symbol.eq(&key.symbol))
                .filter(holdings::asset_kind.eq(key.asset_kind.as_str())),
        )
        .execute(conn)?;
        Ok(())
    }
}
