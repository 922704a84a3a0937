//! `topk_with_deletes`: a bounded top-K CCRDT where entries can be deleted
//! by slot. Operations:
//!
//! - `add { slot, score, element }` — propose `element` for `slot` with
//!   `score`.
//! - `del { slot, removed }` — remove `removed` (a map of element name to
//!   element value) from `slot`.
//!
//! Two `add`s for the same slot merge by keeping the higher score. An `add`
//! followed by a `del` for the same slot always collapses to the `del`
//! alone — the add has not yet been observed by any peer, so forwarding
//! just the delete is sufficient and strictly smaller.

use crate::{CcrdtType, CompactOutcome};
use idc_common::Op;
use serde_json::json;

#[derive(Debug, Default)]
pub struct TopKWithDeletes;

fn slot_of(op: &Op) -> Option<u64> {
    op.0.get("slot")?.as_u64()
}

fn is_add(op: &Op) -> bool {
    op.0.get("kind").and_then(|k| k.as_str()) == Some("add")
}

fn is_del(op: &Op) -> bool {
    op.0.get("kind").and_then(|k| k.as_str()) == Some("del")
}

impl TopKWithDeletes {
    pub fn add(slot: u64, score: i64, element: &str) -> Op {
        Op(json!({ "kind": "add", "slot": slot, "score": score, "element": element }))
    }

    pub fn del(slot: u64, removed: serde_json::Value) -> Op {
        Op(json!({ "kind": "del", "slot": slot, "removed": removed }))
    }
}

impl CcrdtType for TopKWithDeletes {
    fn name(&self) -> &str {
        "topk_with_deletes"
    }

    fn can_compact(&self, older: &Op, newer: &Op) -> bool {
        match slot_of(older).zip(slot_of(newer)) {
            Some((a, b)) if a == b => is_add(older) || is_del(older),
            _ => false,
        }
    }

    fn compact(&self, older: &Op, newer: &Op) -> CompactOutcome {
        if is_add(older) && is_add(newer) {
            let older_score = older.0.get("score").and_then(|v| v.as_i64()).unwrap_or(0);
            let newer_score = newer.0.get("score").and_then(|v| v.as_i64()).unwrap_or(0);
            if newer_score > older_score {
                CompactOutcome::Merged(newer.clone())
            } else {
                CompactOutcome::Merged(older.clone())
            }
        } else {
            // add-then-del, del-then-add, or del-then-del: the most recent
            // delete always wins and fully supersedes anything before it.
            CompactOutcome::Merged(newer.clone())
        }
    }
}
