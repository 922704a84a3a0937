#![doc = include_str!("../README.md")]

//! # idc-ccrdt
//!
//! Registry of computational CRDT (CCRDT) types. A type is a CCRDT iff the
//! registry answers `is_ccrdt` for it; CCRDT types additionally expose a
//! pairwise `can_compact` test and a `compact` function that may cancel a
//! pair of operations to a no-op. Neither predicate is assumed symmetric,
//! associative, or transitive — the compaction engine treats them as given.

pub mod average;
pub mod flag;
pub mod topk;
pub mod topk_with_deletes;

use idc_common::{Op, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

pub use average::Average;
pub use flag::EnableWinsFlag;
pub use topk::TopK;
pub use topk_with_deletes::TopKWithDeletes;

/// Outcome of compacting two ops of the same CCRDT type.
#[derive(Debug, Clone, PartialEq)]
pub enum CompactOutcome {
    /// The pair merges into a single replacement op.
    Merged(Op),
    /// The pair cancels entirely; both records are dropped.
    Noop,
}

/// Capability set a CCRDT type implementation exposes to the engine. `Op` is
/// type-erased to every caller except the implementation itself.
pub trait CcrdtType: Send + Sync {
    /// Stable name this type is registered under.
    fn name(&self) -> &str;

    /// Commutative-sound pairwise test: can `older` and `newer` be merged?
    fn can_compact(&self, older: &Op, newer: &Op) -> bool;

    /// Combine two compactable ops. Must be total whenever `can_compact`
    /// returned true for the same pair.
    fn compact(&self, older: &Op, newer: &Op) -> CompactOutcome;
}

/// Keyed dispatch table mapping a `TypeId` to its CCRDT capability set, if
/// any. Types absent from the table are, by definition, not CCRDTs.
#[derive(Default, Clone)]
pub struct CcrdtRegistry {
    types: HashMap<TypeId, Arc<dyn CcrdtType>>,
}

impl CcrdtRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// A registry pre-populated with the four CCRDT types this crate ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TopKWithDeletes::default()));
        registry.register(Arc::new(TopK::default()));
        registry.register(Arc::new(Average));
        registry.register(Arc::new(EnableWinsFlag));
        registry
    }

    pub fn register(&mut self, ccrdt_type: Arc<dyn CcrdtType>) {
        let type_id = TypeId(ccrdt_type.name().to_string());
        self.types.insert(type_id, ccrdt_type);
    }

    pub fn is_ccrdt(&self, type_id: &TypeId) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn get(&self, type_id: &TypeId) -> Option<Arc<dyn CcrdtType>> {
        self.types.get(type_id).cloned()
    }
}
