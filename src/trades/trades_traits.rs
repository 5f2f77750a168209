use chrono::NaiveDate;

use super::trades_model::{NewTrade, Trade};
use crate::auth::AuthContext;
use crate::db::DbConnection;
use crate::errors::Result;

/// Trait defining the contract for trade ledger repository operations.
///
/// The ledger is append-only: there are no update or delete operations.
/// Every read returns trades in ledger order `(trade_date ASC, id ASC)`, so
/// a `date_upper_bound` read is an order-prefix of the unbounded read.
pub trait TradeRepositoryTrait: Send + Sync {
    /// Appends a trade inside an already-open transaction.
    fn append_with_conn(
        &self,
        conn: &mut DbConnection,
        row: super::trades_model::NewTradeDB,
    ) -> Result<Trade>;

    /// All trades for a user, optionally scoped to one portfolio and bounded
    /// by an inclusive trade date.
    fn list_trades(
        &self,
        user_id: &str,
        portfolio_id: Option<i64>,
        date_upper_bound: Option<NaiveDate>,
    ) -> Result<Vec<Trade>>;
}

/// Trait defining the contract for the trade write entry point.
#[async_trait::async_trait]
pub trait TradeServiceTrait: Send + Sync {
    /// Records a trade: the only write path into the ledger. Appending the
    /// trade and updating the persisted holding projection happen in one
    /// transaction.
    async fn record_trade(&self, auth: &AuthContext, new_trade: NewTrade) -> Result<Trade>;
}
