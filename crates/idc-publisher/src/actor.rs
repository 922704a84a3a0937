use crate::metadata::MetadataService;
use crate::metrics::{SEND_ATTEMPTS, SEND_FAILURES};
use crate::replication::split_for_broadcast;
use crate::transport::Transport;
use crate::wire;
use idc_common::{DcId, Txn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const MAILBOX_CAPACITY: usize = 256;
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// The two payload variants a two-tier `broadcast_tuple` call fans out:
/// `full` to the replication-carrying group, `short` to the rest.
#[derive(Debug, Clone)]
pub struct DualTxnPayload {
    pub full: Txn,
    pub short: Txn,
}

enum Message {
    Broadcast(Txn, oneshot::Sender<()>),
    BroadcastTuple(DualTxnPayload, oneshot::Sender<()>),
    Shutdown,
}

/// A handle to the running publisher actor. Cloning is cheap; every clone
/// shares the same mailbox, so concurrent callers (detached compaction
/// workers from different partitions) are serialized FIFO through one
/// socket-owning task, per spec §5.
#[derive(Clone)]
pub struct PublisherHandle {
    sender: mpsc::Sender<Message>,
    call_timeout: Duration,
}

impl PublisherHandle {
    /// Per spec §4.4: read the DC list fresh, encode `(txn, dcid)`, and
    /// send to each peer. Individual send failures are logged and
    /// swallowed; other destinations are still attempted. A call that does
    /// not complete within the handle's timeout is itself logged and
    /// treated as a best-effort miss (§5's "call-with-timeout discipline"),
    /// never surfaced as an error to the caller.
    pub async fn broadcast(&self, txn: &Txn) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .sender
            .send(Message::Broadcast(txn.clone(), ack_tx))
            .await
            .is_err()
        {
            tracing::warn!("publisher actor is gone, dropping broadcast");
            return;
        }
        if tokio::time::timeout(self.call_timeout, ack_rx).await.is_err() {
            tracing::warn!("publisher call timed out, treating as best-effort miss");
        }
    }

    /// Per spec §4.4: two-tier fan-out. Shuffles the DC list, sends `full`
    /// to the first `R - 1` destinations and `short` to the remainder.
    pub async fn broadcast_tuple(&self, payload: DualTxnPayload) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .sender
            .send(Message::BroadcastTuple(payload, ack_tx))
            .await
            .is_err()
        {
            tracing::warn!("publisher actor is gone, dropping broadcast_tuple");
            return;
        }
        if tokio::time::timeout(self.call_timeout, ack_rx).await.is_err() {
            tracing::warn!("publisher call timed out, treating as best-effort miss");
        }
    }

    /// Terminates the publisher actor, closing its transport. Guaranteed to
    /// run on every shutdown path per the "init -> serve -> teardown"
    /// lifecycle design note.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(Message::Shutdown).await;
    }
}

struct PublisherActor {
    transport: Arc<dyn Transport>,
    metadata: Arc<dyn MetadataService>,
    replication_factor: usize,
    mailbox: mpsc::Receiver<Message>,
}

/// Spawns the singleton publisher actor and returns a handle to it. There
/// should be exactly one of these per node (per spec §4.4); nothing in
/// this crate enforces that beyond convention, the same way the teacher's
/// own singleton services are constructed once at node startup.
pub fn spawn(
    transport: Arc<dyn Transport>,
    metadata: Arc<dyn MetadataService>,
    replication_factor: usize,
) -> PublisherHandle {
    spawn_with_timeout(transport, metadata, replication_factor, DEFAULT_CALL_TIMEOUT)
}

pub fn spawn_with_timeout(
    transport: Arc<dyn Transport>,
    metadata: Arc<dyn MetadataService>,
    replication_factor: usize,
    call_timeout: Duration,
) -> PublisherHandle {
    let (sender, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
    let actor = PublisherActor {
        transport,
        metadata,
        replication_factor,
        mailbox,
    };
    tokio::spawn(actor.run());
    PublisherHandle {
        sender,
        call_timeout,
    }
}

impl PublisherActor {
    async fn run(mut self) {
        while let Some(message) = self.mailbox.recv().await {
            match message {
                Message::Broadcast(txn, ack) => {
                    self.do_broadcast(&txn).await;
                    let _ = ack.send(());
                }
                Message::BroadcastTuple(payload, ack) => {
                    self.do_broadcast_tuple(payload).await;
                    let _ = ack.send(());
                }
                Message::Shutdown => break,
            }
        }
        self.transport.close().await;
    }

    async fn do_broadcast(&self, txn: &Txn) {
        let dcs = self.metadata.read_dc_list().await;
        if dcs.is_empty() {
            return;
        }
        for dcid in &dcs {
            self.send_one(txn, dcid).await;
        }
    }

    async fn do_broadcast_tuple(&self, payload: DualTxnPayload) {
        let dcs = self.metadata.read_dc_list().await;
        if dcs.is_empty() {
            return;
        }
        let split = split_for_broadcast(dcs, self.replication_factor, &mut rand::thread_rng());
        for dcid in &split.full {
            self.send_one(&payload.full, dcid).await;
        }
        for dcid in &split.short {
            self.send_one(&payload.short, dcid).await;
        }
    }

    async fn send_one(&self, txn: &Txn, dcid: &DcId) {
        SEND_ATTEMPTS.inc();
        let bytes = match wire::encode(txn, dcid) {
            Ok(bytes) => bytes,
            Err(error) => {
                SEND_FAILURES.inc();
                tracing::warn!(%dcid, %error, "failed to encode outgoing transaction");
                return;
            }
        };
        if let Err(error) = self.transport.send(dcid, bytes).await {
            SEND_FAILURES.inc();
            tracing::warn!(%dcid, %error, "failed to publish to datacenter, skipping");
        }
    }
}
