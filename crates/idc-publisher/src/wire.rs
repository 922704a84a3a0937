//! The wire envelope: `(txn, dcid)` encoded for the transport. Symmetric to
//! whatever decoder sits on the peer datacenter's end — a black box here,
//! per spec §4.4.

use crate::error::TransportError;
use idc_common::{DcId, Txn};

pub fn encode(txn: &Txn, dcid: &DcId) -> Result<Vec<u8>, TransportError> {
    bincode::serialize(&(txn, dcid)).map_err(TransportError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idc_common::{LogOperation, LogRecord, OpBody, PartitionId, TxId};

    #[test]
    fn encodes_txn_and_dcid_pair() {
        let txn = Txn {
            dcid: DcId::from("dc1"),
            partition: PartitionId(0),
            prev_log_opid: 0,
            snapshot: 0,
            timestamp: 0,
            log_records: vec![LogRecord {
                version: 1,
                op_number: 1,
                bucket_op_number: 1,
                log_operation: LogOperation {
                    tx_id: TxId(1),
                    body: OpBody::Commit { commit_time: 1 },
                },
            }],
        };
        let bytes = encode(&txn, &DcId::from("dc2")).unwrap();
        assert!(!bytes.is_empty());
    }
}
