//! `average`: tracks a running `(sum, count)` pair. Every op is
//! `add { sum, count }`; any two adds merge by summing both fields.

use crate::{CcrdtType, CompactOutcome};
use idc_common::Op;
use serde_json::json;

#[derive(Debug, Default)]
pub struct Average;

fn field(op: &Op, name: &str) -> i64 {
    op.0.get(name).and_then(|v| v.as_i64()).unwrap_or(0)
}

impl Average {
    pub fn add(sum: i64, count: i64) -> Op {
        Op(json!({ "sum": sum, "count": count }))
    }
}

impl CcrdtType for Average {
    fn name(&self) -> &str {
        "average"
    }

    fn can_compact(&self, _older: &Op, _newer: &Op) -> bool {
        // Every add on the same key/bucket is compactable with every other.
        true
    }

    fn compact(&self, older: &Op, newer: &Op) -> CompactOutcome {
        let sum = field(older, "sum") + field(newer, "sum");
        let count = field(older, "count") + field(newer, "count");
        CompactOutcome::Merged(Average::add(sum, count))
    }
}
