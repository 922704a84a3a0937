use async_trait::async_trait;
use idc_common::Txn;

/// The vnode's view of the publisher: fire-and-forget, one transaction at a
/// time. Defined here (rather than depended on from `idc-publisher`) so the
/// actor can be tested against a fake without pulling in a transport stack.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, txn: &Txn);
}
