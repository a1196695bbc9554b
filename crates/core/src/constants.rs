/// Currency every price is normalized into
pub const SETTLEMENT_CURRENCY: &str = "EUR";

/// Source currencies instruments may be quoted in
pub const SUPPORTED_CURRENCIES: [&str; 3] = ["USD", "GBP", "EUR"];

/// First date fetched for an instrument with no stored history (YYYY-MM-DD)
pub const DEFAULT_HISTORY_START: &str = "2021-12-01";

/// Calendar days covered by trailing high/low metrics
pub const TRAILING_WINDOW_DAYS: i64 = 365;

/// Percentage drops from the trailing high that get a threshold price
pub const DECREASE_THRESHOLD_PCTS: [u32; 5] = [10, 15, 20, 25, 30];

/// Decimal places of settlement-currency prices
pub const SETTLEMENT_DECIMAL_PRECISION: u32 = 2;

/// Quote fetch attempts per instrument per cycle
pub const DEFAULT_MAX_FETCH_ATTEMPTS: u32 = 3;

/// Delay between quote fetch attempts, in seconds
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 60;
