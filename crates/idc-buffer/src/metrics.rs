use once_cell::sync::Lazy;
use prometheus_client::metrics::counter::Counter;

/// Counts completed flush-and-publish cycles across all vnodes.
pub static FLUSH_COUNT: Lazy<Counter> = Lazy::new(Counter::default);

/// Counts records a compaction pass merged or cancelled (Noop), summed
/// across all vnodes.
pub static RECORDS_COMPACTED: Lazy<Counter> = Lazy::new(Counter::default);
