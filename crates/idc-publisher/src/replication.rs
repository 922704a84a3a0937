//! The two-tier fan-out split used by [`crate::Publisher::broadcast_tuple`].

use idc_common::DcId;
use rand::seq::SliceRandom;
use rand::Rng;

/// A transaction paired with the two payload variants peers in each tier
/// receive: `full` gets the replication-carrying copy, `short` gets the
/// lighter one. What makes a payload "full" vs. "short" is a concern of the
/// caller (e.g. whether the full copy embeds the complete op log and the
/// short copy only a digest) — this module only owns the fan-out split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcSplit {
    /// Destinations that should receive the "full" payload.
    pub full: Vec<DcId>,
    /// Destinations that should receive the "short" payload.
    pub short: Vec<DcId>,
}

/// Shuffles `dcs` uniformly at random and splits it into a prefix of size
/// `replication_factor - 1` (the full group) and the remainder (the short
/// group). If `dcs` has fewer than `replication_factor - 1` members, every
/// available DC lands in the full group and the short group is empty.
pub fn split_for_broadcast<R: Rng + ?Sized>(
    mut dcs: Vec<DcId>,
    replication_factor: usize,
    rng: &mut R,
) -> DcSplit {
    dcs.shuffle(rng);
    let full_len = dcs.len().min(replication_factor.saturating_sub(1));
    let short = dcs.split_off(full_len);
    DcSplit { full: dcs, short }
}
