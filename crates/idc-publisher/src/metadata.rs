use async_trait::async_trait;
use idc_common::DcId;

/// Source of truth for the current set of peer datacenters. Read fresh on
/// every broadcast (snapshot semantics, no caching): membership can change
/// between flushes and the publisher must not act on a stale list.
///
/// Per spec §6: any internal failure (the underlying metadata read
/// returning other than `ok`) is caught by the implementation and
/// surfaced here as an empty list — this trait is infallible at the
/// boundary (fail-open to a no-op broadcast).
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn read_dc_list(&self) -> Vec<DcId>;
}

/// A `MetadataService` backed by a fixed, in-memory list. Useful for tests
/// and for single-metadata-store deployments that refresh the list out of
/// band and hand the publisher a shared, lock-guarded snapshot.
pub struct StaticDcList(std::sync::RwLock<Vec<DcId>>);

impl StaticDcList {
    pub fn new(dcs: Vec<DcId>) -> Self {
        Self(std::sync::RwLock::new(dcs))
    }

    /// Replaces the list in place, e.g. in response to a membership-change
    /// notification from the surrounding cluster machinery.
    pub fn set(&self, dcs: Vec<DcId>) {
        *self.0.write().expect("dc list lock poisoned") = dcs;
    }
}

#[async_trait]
impl MetadataService for StaticDcList {
    async fn read_dc_list(&self) -> Vec<DcId> {
        self.0.read().expect("dc list lock poisoned").clone()
    }
}
