#![doc = include_str!("../README.md")]
//!
//! # idc-publisher
//!
//! The single-process broadcaster: owns one outbound publish endpoint and
//! fans compacted transactions out to peer datacenters. Realized as a
//! Tokio task with its own mailbox (see [`actor`]) so concurrent callers —
//! detached compaction workers from different partitions — are serialized
//! FIFO through one socket, matching the actor-mailbox model the rest of
//! this workspace's crates use.

mod actor;
mod address;
mod error;
mod metadata;
mod metrics;
mod replication;
mod transport;
mod wire;

pub use actor::{spawn, spawn_with_timeout, DualTxnPayload, PublisherHandle};
pub use address::{broadcast_capable_addresses, local_address};
pub use error::{PublisherError, TransportError};
pub use metadata::{MetadataService, StaticDcList};
pub use metrics::{SEND_ATTEMPTS, SEND_FAILURES};
pub use replication::{split_for_broadcast, DcSplit};
pub use transport::{TcpTransport, Transport};

use async_trait::async_trait;
use idc_buffer::Broadcaster;
use idc_common::Txn;

/// Plugs a [`PublisherHandle`] directly into `idc_buffer::spawn` as the
/// vnode's `Broadcaster`: the buffer vnode only ever needs the one-at-a-
/// time `broadcast` call, not `broadcast_tuple`.
#[async_trait]
impl Broadcaster for PublisherHandle {
    async fn broadcast(&self, txn: &Txn) {
        PublisherHandle::broadcast(self, txn).await
    }
}
