//! `topk`: a bounded top-K CCRDT without deletes. Every op is
//! `add { element, score }`; two adds for the same element merge by keeping
//! the higher score.

use crate::{CcrdtType, CompactOutcome};
use idc_common::Op;
use serde_json::json;

#[derive(Debug, Default)]
pub struct TopK;

fn element_of(op: &Op) -> Option<&str> {
    op.0.get("element")?.as_str()
}

fn score_of(op: &Op) -> i64 {
    op.0.get("score").and_then(|v| v.as_i64()).unwrap_or(0)
}

impl TopK {
    pub fn add(element: &str, score: i64) -> Op {
        Op(json!({ "element": element, "score": score }))
    }
}

impl CcrdtType for TopK {
    fn name(&self) -> &str {
        "topk"
    }

    fn can_compact(&self, older: &Op, newer: &Op) -> bool {
        matches!(
            element_of(older).zip(element_of(newer)),
            Some((a, b)) if a == b
        )
    }

    fn compact(&self, older: &Op, newer: &Op) -> CompactOutcome {
        if score_of(newer) > score_of(older) {
            CompactOutcome::Merged(newer.clone())
        } else {
            CompactOutcome::Merged(older.clone())
        }
    }
}
