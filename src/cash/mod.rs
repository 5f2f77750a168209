use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;

/// External cash ledger capability.
///
/// Cash is a plain income-minus-expense running total owned by the wallet
/// subsystem; it is summed, not replayed. The valuation aggregator only
/// consumes these two lookups.
pub trait CashLedgerTrait: Send + Sync {
    /// Cash balance including everything dated on or before `date`.
    fn balance_as_of(&self, date: NaiveDate) -> Result<Decimal>;

    /// Current cash balance.
    fn balance_now(&self) -> Result<Decimal>;
}
