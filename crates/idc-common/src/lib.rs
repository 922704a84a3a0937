#![doc = include_str!("../README.md")]

//! # idc-common
//!
//! Shared data model, error definitions, and small utilities used across the
//! inter-datacenter buffering and compaction crates (`idc-ccrdt`,
//! `idc-compaction`, `idc-buffer`, `idc-publisher`).

pub mod address_config;
pub mod error;
pub mod model;

pub use address_config::NodeAddressConfig;
pub use error::CommonError;
pub use model::{
    Bucket, DcId, Key, LogOperation, LogRecord, NodeId, Op, OpBody, PartitionId, Txn, TypeId, TxId,
};
