use thiserror::Error;

/// Errors the publisher's transport boundary can raise. Per-destination
/// send failures are caught and logged by [`crate::Publisher`] itself; this
/// enum only needs to reach callers for init-time failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind publish endpoint on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to send to {dcid}: {source}")]
    Send {
        dcid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding failed: {0}")]
    Encode(#[from] bincode::Error),
}

/// Errors surfaced by publisher construction and address discovery.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Common(#[from] idc_common::CommonError),

    #[error("no non-loopback network interface found")]
    NoBroadcastAddress,
}
