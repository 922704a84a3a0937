#![doc = include_str!("../README.md")]
//!
//! # idc-buffer
//!
//! The vnode is a Tokio task with an owned `mpsc` mailbox: `buffer()` calls
//! and the internal timer tick are both handled inside one `select!` loop,
//! so the queue never needs a lock. See [`actor`] for the loop itself.

mod actor;
mod broadcaster;
mod error;
mod metrics;
mod ring;

pub use actor::{spawn, VnodeHandle};
pub use broadcaster::Broadcaster;
pub use error::BufferError;
pub use metrics::{FLUSH_COUNT, RECORDS_COMPACTED};
pub use ring::RingService;
