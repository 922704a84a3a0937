//! The transaction / log-record data model consumed by the compaction core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Peer datacenter identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DcId(pub String);

impl fmt::Display for DcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DcId {
    fn from(s: &str) -> Self {
        DcId(s.to_string())
    }
}

/// Identifier for a ring node, used by `RingService` ownership checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Ring partition identifier owned by one buffer vnode at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionId(pub u64);

/// Identifier for a data type; the CCRDT registry answers `is_ccrdt` for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub String);

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        TypeId(s.to_string())
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Key = String;
pub type Bucket = String;

/// Transaction identifier shared by every log record of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(pub u64);

/// An opaque operation payload. The compaction engine never looks inside
/// this value; only the `CcrdtType` implementation named by the owning
/// record's `TypeId` interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op(pub serde_json::Value);

impl Op {
    pub fn new(value: serde_json::Value) -> Self {
        Op(value)
    }
}

/// The tagged body of a log operation. `Update` carries the CCRDT/non-CCRDT
/// payload; the other variants carry only the metadata a terminal record
/// needs, mirroring the design note's "tagged sum, not string + optionals".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpBody {
    Update {
        key: Key,
        bucket: Bucket,
        type_id: TypeId,
        op: Op,
    },
    Prepare {
        prepare_time: u64,
    },
    Commit {
        commit_time: u64,
    },
    Abort {
        reason: Option<String>,
    },
    /// Any other terminal/non-update record a log source may emit; carried
    /// through compaction untouched save for the rewritten `tx_id`.
    Other {
        label: String,
    },
}

impl OpBody {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OpBody::Commit { .. } | OpBody::Abort { .. })
    }
}

/// One log operation: the owning transaction id plus its tagged body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogOperation {
    pub tx_id: TxId,
    pub body: OpBody,
}

/// One entry in a transaction's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub version: u64,
    pub op_number: u64,
    pub bucket_op_number: u64,
    pub log_operation: LogOperation,
}

impl LogRecord {
    pub fn tx_id(&self) -> TxId {
        self.log_operation.tx_id
    }
}

/// An inter-DC transaction: one unit of committed work carried across the
/// buffer, the compaction engine, and the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Txn {
    pub dcid: DcId,
    pub partition: PartitionId,
    pub prev_log_opid: u64,
    pub snapshot: u64,
    pub timestamp: u64,
    pub log_records: Vec<LogRecord>,
}

impl Txn {
    /// The `tx_id` shared by every log record of this transaction. Panics on
    /// a malformed (empty) transaction — callers are expected to validate
    /// with [`Txn::validate`] first.
    pub fn tx_id(&self) -> TxId {
        self.log_records[0].tx_id()
    }

    /// Validates the invariants from the data-model spec: non-empty,
    /// exactly one terminal record at the end, and a single shared `tx_id`.
    pub fn validate(&self) -> Result<(), crate::CommonError> {
        let Some(last) = self.log_records.last() else {
            return Err(crate::CommonError::MalformedTransaction(
                "transaction has no log records".into(),
            ));
        };
        if !last.log_operation.body.is_terminal() {
            return Err(crate::CommonError::MalformedTransaction(
                "transaction does not end with a commit/abort record".into(),
            ));
        }
        let terminal_count = self
            .log_records
            .iter()
            .filter(|r| r.log_operation.body.is_terminal())
            .count();
        if terminal_count != 1 {
            return Err(crate::CommonError::MalformedTransaction(format!(
                "expected exactly one terminal record, found {terminal_count}"
            )));
        }
        let tx_id = self.log_records[0].tx_id();
        if self.log_records.iter().any(|r| r.tx_id() != tx_id) {
            return Err(crate::CommonError::MalformedTransaction(
                "log records do not share one tx_id".into(),
            ));
        }
        Ok(())
    }
}
