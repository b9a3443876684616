// Defaults shared by the config loader and the exchange adapter.
pub const DEFAULT_QUOTE_CURRENCY: &str = "USDT";
pub const DEFAULT_ACCOUNT_TYPE: &str = "UNIFIED";
pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

// Percentages are given on a 0..=100 scale
pub const PERCENT_SCALE: u32 = 100;

// Prefix of the orderLinkId attached to every order we send.
// The suffix is a fresh uuid, so it never deduplicates re-submissions.
pub const ORDER_LINK_PREFIX: &str = "bsb";

// Code carried by ExchangeRejected when a request is refused locally,
// before anything is sent to the exchange
pub const LOCAL_REJECTION_CODE: i64 = -1;
