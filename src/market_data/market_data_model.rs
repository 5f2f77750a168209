use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Live quote for one externally priced asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: Decimal,
    pub change_24h_percent: Decimal,
}
