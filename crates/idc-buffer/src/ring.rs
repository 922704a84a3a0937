use idc_common::{NodeId, PartitionId};

/// Cluster membership as seen by one vnode: who owns a partition, and am I
/// that node. The buffer vnode consults this on every timer tick; it never
/// assumes ownership is stable.
pub trait RingService: Send + Sync {
    fn index_owner(&self, partition: PartitionId) -> NodeId;

    fn my_node(&self) -> NodeId;

    fn owns(&self, partition: PartitionId) -> bool {
        self.index_owner(partition) == self.my_node()
    }
}
