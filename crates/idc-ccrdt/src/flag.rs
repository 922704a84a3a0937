//! `enable_wins_flag`: a boolean flag CCRDT with `enable`/`disable` ops.
//!
//! Same-direction transitions merge by keeping the later one (idempotent).
//! Opposite-direction transitions — an `enable` immediately followed by a
//! `disable`, or vice versa — cancel to [`CompactOutcome::Noop`]: neither
//! transition has been observed by any peer yet, so forwarding nothing is
//! observationally identical to forwarding both.

use crate::{CcrdtType, CompactOutcome};
use idc_common::Op;
use serde_json::json;

#[derive(Debug, Default)]
pub struct EnableWinsFlag;

fn is_enable(op: &Op) -> bool {
    op.0.get("kind").and_then(|k| k.as_str()) == Some("enable")
}

impl EnableWinsFlag {
    pub fn enable() -> Op {
        Op(json!({ "kind": "enable" }))
    }

    pub fn disable() -> Op {
        Op(json!({ "kind": "disable" }))
    }
}

impl CcrdtType for EnableWinsFlag {
    fn name(&self) -> &str {
        "enable_wins_flag"
    }

    fn can_compact(&self, _older: &Op, _newer: &Op) -> bool {
        // Every transition on the same flag is compactable with the next.
        true
    }

    fn compact(&self, older: &Op, newer: &Op) -> CompactOutcome {
        if is_enable(older) == is_enable(newer) {
            CompactOutcome::Merged(newer.clone())
        } else {
            CompactOutcome::Noop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_direction_merges_to_later() {
        let t = EnableWinsFlag;
        let older = EnableWinsFlag::enable();
        let newer = EnableWinsFlag::enable();
        assert_eq!(
            t.compact(&older, &newer),
            CompactOutcome::Merged(newer.clone())
        );
    }

    #[test]
    fn opposite_direction_cancels() {
        let t = EnableWinsFlag;
        assert_eq!(
            t.compact(&EnableWinsFlag::enable(), &EnableWinsFlag::disable()),
            CompactOutcome::Noop
        );
        assert_eq!(
            t.compact(&EnableWinsFlag::disable(), &EnableWinsFlag::enable()),
            CompactOutcome::Noop
        );
    }
}
