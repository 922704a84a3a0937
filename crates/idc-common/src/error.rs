use thiserror::Error;

/// Errors shared across the inter-datacenter buffering and compaction
/// crates. Mirrors the workspace convention of one `thiserror` enum per
/// crate, with a common error every other crate's enum can wrap via
/// `#[from]`.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
