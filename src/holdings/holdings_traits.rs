use super::holdings_model::{Holding, HoldingKey, HoldingRecord};
use crate::db::DbConnection;
use crate::errors::Result;

/// Trait defining the contract for the persisted holdings projection.
///
/// Rows here are a cache of the projector's output for the "current" cutoff,
/// updated in the same transaction as every trade append.
pub trait HoldingsRepositoryTrait: Send + Sync {
    fn get_for_user(&self, user_id: &str, portfolio_id: Option<i64>) -> Result<Vec<HoldingRecord>>;
    fn find_by_key(&self, key: &HoldingKey) -> Result<Option<HoldingRecord>>;
    fn find_by_key_with_conn(
        &self,
        conn: &mut DbConnection,
        key: &HoldingKey,
    ) -> Result<Option<HoldingRecord>>;
    fn upsert_with_conn(
        &self,
        conn: &mut DbConnection,
        key: &HoldingKey,
        holding: &Holding,
    ) -> Result<()>;
    fn delete_by_key_with_conn(&self, conn: &mut DbConnection, key: &HoldingKey) -> Result<()>;
}
