//! End-to-end wiring of the inter-datacenter buffering and compaction core:
//! a buffer vnode accepts transactions, flushes on its timer through
//! `idc-compaction` (using the `idc-ccrdt` registry), and the result lands
//! on a publisher that fans it out over a fake in-memory transport.

use async_trait::async_trait;
use idc_buffer::RingService;
use idc_ccrdt::{Average, CcrdtRegistry};
use idc_common::{DcId, LogOperation, LogRecord, NodeId, OpBody, PartitionId, Txn, TxId, TypeId};
use idc_publisher::{StaticDcList, TransportError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct AlwaysOwned;

impl RingService for AlwaysOwned {
    fn index_owner(&self, _partition: PartitionId) -> NodeId {
        NodeId::from("me")
    }

    fn my_node(&self) -> NodeId {
        NodeId::from("me")
    }
}

/// A `Transport` that reports every send down an unbounded channel instead
/// of touching a real socket, so tests can `.recv().await` deterministically
/// regardless of how the runtime schedules the detached compaction worker.
struct RecordingTransport(mpsc::UnboundedSender<(DcId, Vec<u8>)>);

#[async_trait]
impl idc_publisher::Transport for RecordingTransport {
    async fn send(&self, dcid: &DcId, bytes: Vec<u8>) -> Result<(), TransportError> {
        let _ = self.0.send((dcid.clone(), bytes));
        Ok(())
    }

    async fn close(&self) {}
}

fn average_update_txn(tx_id: u64, timestamp: u64, sum: i64, count: i64) -> Txn {
    Txn {
        dcid: DcId::from("dc-local"),
        partition: PartitionId(0),
        prev_log_opid: tx_id.saturating_sub(1),
        snapshot: 0,
        timestamp,
        log_records: vec![
            LogRecord {
                version: 1,
                op_number: 1,
                bucket_op_number: 1,
                log_operation: LogOperation {
                    tx_id: TxId(tx_id),
                    body: OpBody::Update {
                        key: "daily-latency".into(),
                        bucket: "metrics".into(),
                        type_id: TypeId::from("average"),
                        op: Average::add(sum, count),
                    },
                },
            },
            LogRecord {
                version: 1,
                op_number: 2,
                bucket_op_number: 2,
                log_operation: LogOperation {
                    tx_id: TxId(tx_id),
                    body: OpBody::Commit {
                        commit_time: timestamp,
                    },
                },
            },
        ],
    }
}

#[tokio::test(start_paused = true)]
async fn two_buffered_transactions_compact_and_reach_both_peer_datacenters() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = Arc::new(RecordingTransport(tx));
    let metadata = Arc::new(StaticDcList::new(vec![DcId::from("dc-a"), DcId::from("dc-b")]));
    let publisher = idc_publisher::spawn(transport, metadata, 3);

    let vnode = idc_buffer::spawn(
        PartitionId(7),
        Arc::new(AlwaysOwned),
        Arc::new(CcrdtRegistry::with_defaults()),
        Arc::new(publisher.clone()),
        Duration::from_millis(10),
    );

    vnode.buffer(average_update_txn(1, 100, 100, 2)).await.unwrap();
    vnode.buffer(average_update_txn(2, 200, 10, 1)).await.unwrap();

    tokio::time::advance(Duration::from_millis(15)).await;

    let mut received = Vec::new();
    for _ in 0..2 {
        received.push(rx.recv().await.expect("both peer datacenters get the compacted txn"));
    }
    vnode.shutdown().await;

    let mut dcs: Vec<&str> = received.iter().map(|(d, _)| d.0.as_str()).collect();
    dcs.sort_unstable();
    assert_eq!(dcs, vec!["dc-a", "dc-b"]);

    for (_, bytes) in &received {
        let (txn, _dcid): (Txn, DcId) = bincode::deserialize(bytes).unwrap();
        assert_eq!(txn.log_records.len(), 2, "one merged average update + commit");
        let merged = match &txn.log_records[0].log_operation.body {
            OpBody::Update { op, .. } => op.clone(),
            other => panic!("expected an update record, got {other:?}"),
        };
        assert_eq!(merged, Average::add(110, 3));
    }
}

#[tokio::test(start_paused = true)]
async fn vnode_with_no_ccrdt_updates_passes_transactions_through_unchanged() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = Arc::new(RecordingTransport(tx));
    let metadata = Arc::new(StaticDcList::new(vec![DcId::from("dc-a")]));
    let publisher = idc_publisher::spawn(transport, metadata, 2);

    let vnode = idc_buffer::spawn(
        PartitionId(1),
        Arc::new(AlwaysOwned),
        Arc::new(CcrdtRegistry::with_defaults()),
        Arc::new(publisher.clone()),
        Duration::from_millis(10),
    );

    let plain = Txn {
        dcid: DcId::from("dc-local"),
        partition: PartitionId(1),
        prev_log_opid: 0,
        snapshot: 0,
        timestamp: 50,
        log_records: vec![LogRecord {
            version: 1,
            op_number: 1,
            bucket_op_number: 1,
            log_operation: LogOperation {
                tx_id: TxId(9),
                body: OpBody::Commit { commit_time: 50 },
            },
        }],
    };
    vnode.buffer(plain.clone()).await.unwrap();

    tokio::time::advance(Duration::from_millis(15)).await;
    let (_dcid, bytes) = rx.recv().await.expect("the lone dc receives the untouched txn");
    vnode.shutdown().await;

    let (txn, _dcid): (Txn, DcId) = bincode::deserialize(&bytes).unwrap();
    assert_eq!(txn, plain);
}

#[tokio::test(start_paused = true)]
async fn losing_partition_ownership_quiesces_the_vnode() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = Arc::new(RecordingTransport(tx));
    let metadata = Arc::new(StaticDcList::new(vec![DcId::from("dc-a")]));
    let publisher = idc_publisher::spawn(transport, metadata, 2);

    struct Flippable(AtomicBool);
    impl RingService for Flippable {
        fn index_owner(&self, _partition: PartitionId) -> NodeId {
            if self.0.load(Ordering::SeqCst) {
                NodeId::from("me")
            } else {
                NodeId::from("someone-else")
            }
        }
        fn my_node(&self) -> NodeId {
            NodeId::from("me")
        }
    }

    let ring = Arc::new(Flippable(AtomicBool::new(true)));
    let vnode = idc_buffer::spawn(
        PartitionId(3),
        ring.clone(),
        Arc::new(CcrdtRegistry::with_defaults()),
        Arc::new(publisher.clone()),
        Duration::from_millis(10),
    );

    ring.0.store(false, Ordering::SeqCst);
    vnode
        .buffer(average_update_txn(1, 100, 1, 1))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_millis(15)).await;

    assert!(
        rx.try_recv().is_err(),
        "ownership was lost before the first tick, so the vnode never re-arms"
    );
}
