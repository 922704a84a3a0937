use once_cell::sync::Lazy;
use prometheus_client::metrics::counter::Counter;

/// Counts individual per-DC sends attempted across all `broadcast` calls.
pub static SEND_ATTEMPTS: Lazy<Counter> = Lazy::new(Counter::default);

/// Counts individual per-DC sends that failed and were swallowed.
pub static SEND_FAILURES: Lazy<Counter> = Lazy::new(Counter::default);
