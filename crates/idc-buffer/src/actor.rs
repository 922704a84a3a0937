use crate::{BufferError, Broadcaster, RingService, FLUSH_COUNT, RECORDS_COMPACTED};
use idc_ccrdt::CcrdtRegistry;
use idc_common::{PartitionId, Txn};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

const MAILBOX_CAPACITY: usize = 256;

enum Message {
    Buffer(Txn, oneshot::Sender<()>),
    Shutdown,
}

/// A handle to a running buffer vnode. Cloning is cheap; every clone shares
/// the same mailbox.
#[derive(Clone)]
pub struct VnodeHandle {
    sender: mpsc::Sender<Message>,
}

impl VnodeHandle {
    /// Enqueues `txn`, returning once the actor has accepted it into its
    /// in-memory queue. O(1): the actor prepends to a `VecDeque`.
    pub async fn buffer(&self, txn: Txn) -> Result<(), BufferError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.sender
            .send(Message::Buffer(txn, ack_tx))
            .await
            .map_err(|_| BufferError::ActorGone)?;
        ack_rx.await.map_err(|_| BufferError::ActorGone)
    }

    /// Cancels the timer and drops whatever is in the queue without
    /// flushing it — the handoff semantics for a partition this node no
    /// longer needs to serve.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(Message::Shutdown).await;
    }
}

struct VnodeActor {
    partition: PartitionId,
    ring: Arc<dyn RingService>,
    registry: Arc<CcrdtRegistry>,
    broadcaster: Arc<dyn Broadcaster>,
    tick_period: Duration,
    buffer: VecDeque<Txn>,
    mailbox: mpsc::Receiver<Message>,
}

/// Spawns a buffer vnode for `partition` and returns a handle to it. The
/// timer only starts if this node owns the partition at spawn time; if not,
/// the actor exits immediately without processing any message.
pub fn spawn(
    partition: PartitionId,
    ring: Arc<dyn RingService>,
    registry: Arc<CcrdtRegistry>,
    broadcaster: Arc<dyn Broadcaster>,
    tick_period: Duration,
) -> VnodeHandle {
    let (sender, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
    let actor = VnodeActor {
        partition,
        ring,
        registry,
        broadcaster,
        tick_period,
        buffer: VecDeque::new(),
        mailbox,
    };
    tokio::spawn(actor.run());
    VnodeHandle { sender }
}

impl VnodeActor {
    async fn run(mut self) {
        if !self.ring.owns(self.partition) {
            tracing::debug!(partition = self.partition.0, "vnode not owned at spawn, exiting");
            return;
        }

        let mut timer = tokio::time::interval(self.tick_period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                message = self.mailbox.recv() => {
                    match message {
                        Some(Message::Buffer(txn, ack)) => {
                            self.buffer.push_front(txn);
                            let _ = ack.send(());
                        }
                        Some(Message::Shutdown) | None => {
                            tracing::debug!(partition = self.partition.0, "vnode shutting down");
                            return;
                        }
                    }
                }
                _ = timer.tick() => {
                    if !self.ring.owns(self.partition) {
                        tracing::info!(partition = self.partition.0, "lost partition ownership, stopping vnode");
                        return;
                    }
                    self.flush();
                }
            }
        }
    }

    /// Empty buffer: re-arm and return. Otherwise swap the queue out,
    /// restore commit order, and hand it to a detached worker so the timer
    /// loop is never blocked on compaction or publish.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut batch: Vec<Txn> = std::mem::take(&mut self.buffer).into();
        batch.reverse();

        let registry = Arc::clone(&self.registry);
        let broadcaster = Arc::clone(&self.broadcaster);
        tokio::spawn(async move {
            compact_and_publish(registry, broadcaster, batch).await;
        });
    }
}

async fn compact_and_publish(
    registry: Arc<CcrdtRegistry>,
    broadcaster: Arc<dyn Broadcaster>,
    batch: Vec<Txn>,
) {
    let fallback = batch.clone();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        idc_compaction::compact(&registry, batch)
    }));

    let published = match outcome {
        Ok((compacted, stats)) => {
            FLUSH_COUNT.inc();
            RECORDS_COMPACTED.inc_by((stats.records_merged + stats.records_cancelled) as u64);
            tracing::debug!(
                input_transactions = stats.input_transactions,
                ccrdt_groups = stats.ccrdt_groups,
                records_merged = stats.records_merged,
                records_cancelled = stats.records_cancelled,
                "flushed batch compacted"
            );
            compacted
        }
        Err(_) => {
            tracing::warn!("ccrdt compaction panicked, publishing the uncompacted batch");
            fallback
        }
    };

    for txn in &published {
        broadcaster.broadcast(txn).await;
    }
}
