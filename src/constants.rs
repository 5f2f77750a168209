/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 8;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Calendar date format used for ledger dates stored as TEXT
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lifetime of a cached live quote
pub const QUOTE_CACHE_TTL_SECS: u64 = 300;

/// Timeout for a single market data provider call
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Upper bound on the daily history window
pub const MAX_HISTORY_DAYS: u32 = 365;
