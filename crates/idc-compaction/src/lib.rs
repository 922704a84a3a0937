#![doc = include_str!("../README.md")]
//!
//! # idc-compaction
//!
//! See the crate-level README for the one-line summary. The algorithm:
//!
//! 1. Fast path: empty input returns empty output; input with no CCRDT
//!    update anywhere returns the input unchanged.
//! 2. Single left-to-right pass over every transaction's log records,
//!    partitioning each into: non-CCRDT updates (kept in original order),
//!    CCRDT updates (grouped by `(key, bucket)`, insertion-ordered via
//!    `IndexMap`), and the transaction's own remaining records (its
//!    prepare/commit/abort/other records). Every record visited has its
//!    `tx_id` rewritten to the last transaction's `tx_id`.
//! 3. Each CCRDT group folds independently (see [`compact_group`]).
//! 4. The output is one transaction: `prev_log_opid` of the first input
//!    transaction, metadata of the last, and a log made of non-CCRDT
//!    updates, then folded CCRDT updates (groups in first-seen order),
//!    then the last transaction's own remaining records.

use idc_ccrdt::{CcrdtRegistry, CcrdtType, CompactOutcome};
use idc_common::{Bucket, Key, LogRecord, OpBody, Op, Txn};
use indexmap::IndexMap;

/// Counts describing one [`compact`] call, useful for logging at the
/// call site (this crate itself never logs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    pub input_transactions: usize,
    pub ccrdt_groups: usize,
    pub records_merged: usize,
    pub records_cancelled: usize,
}

/// Folds `input` (assumed committed in ascending order, oldest first) into
/// a single transaction wherever any of its records update a registered
/// CCRDT type. Returns the input unchanged, without allocating a new
/// transaction, when no such update is present.
pub fn compact(registry: &CcrdtRegistry, input: Vec<Txn>) -> (Vec<Txn>, CompactionStats) {
    if input.is_empty() {
        return (input, CompactionStats::default());
    }

    let has_ccrdt_update = input.iter().any(|txn| {
        txn.log_records.iter().any(|r| match &r.log_operation.body {
            OpBody::Update { type_id, .. } => registry.is_ccrdt(type_id),
            _ => false,
        })
    });
    if !has_ccrdt_update {
        let stats = CompactionStats {
            input_transactions: input.len(),
            ..Default::default()
        };
        return (input, stats);
    }

    let input_transactions = input.len();
    let prev_log_opid = input[0].prev_log_opid;
    let target_tx_id = input.last().expect("checked non-empty above").tx_id();

    let mut other_updates: Vec<LogRecord> = Vec::new();
    let mut ccrdt_groups: IndexMap<(Key, Bucket), Vec<LogRecord>> = IndexMap::new();
    let mut cleaned_txns: Vec<Txn> = Vec::with_capacity(input_transactions);

    for txn in input.into_iter() {
        let Txn {
            dcid,
            partition,
            snapshot,
            timestamp,
            log_records,
            ..
        } = txn;
        let mut remaining = Vec::new();
        for mut record in log_records.into_iter() {
            record.log_operation.tx_id = target_tx_id;
            match &record.log_operation.body {
                OpBody::Update {
                    type_id, key, bucket, ..
                } if registry.is_ccrdt(type_id) => {
                    let group_key = (key.clone(), bucket.clone());
                    ccrdt_groups.entry(group_key).or_default().push(record);
                }
                OpBody::Update { .. } => other_updates.push(record),
                _ => remaining.push(record),
            }
        }
        cleaned_txns.push(Txn {
            dcid,
            partition,
            prev_log_opid: 0,
            snapshot,
            timestamp,
            log_records: remaining,
        });
    }

    let mut stats = CompactionStats {
        input_transactions,
        ccrdt_groups: ccrdt_groups.len(),
        ..Default::default()
    };

    let mut ccrdt_ops = Vec::new();
    for (_group_key, records) in ccrdt_groups.into_iter() {
        let type_id = match &records[0].log_operation.body {
            OpBody::Update { type_id, .. } => type_id.clone(),
            _ => unreachable!("ccrdt group contains only update records"),
        };
        let ccrdt_type = registry
            .get(&type_id)
            .expect("group key was only ever inserted for a registered ccrdt type");
        let folded = compact_group(ccrdt_type.as_ref(), records, &mut stats);
        ccrdt_ops.extend(folded);
    }

    let mut last_cleaned = cleaned_txns.pop().expect("input was non-empty");
    last_cleaned.prev_log_opid = prev_log_opid;

    let mut log_records = Vec::with_capacity(
        other_updates.len() + ccrdt_ops.len() + last_cleaned.log_records.len(),
    );
    log_records.extend(other_updates);
    log_records.extend(ccrdt_ops);
    log_records.extend(last_cleaned.log_records);
    last_cleaned.log_records = log_records;

    (vec![last_cleaned], stats)
}

/// Folds one `(key, bucket)`'s CCRDT update records, oldest first, into the
/// minimal equivalent sequence.
///
/// Maintains an accumulator ordered most-recent-first. For each incoming
/// record, searches the accumulator from the most recent candidate backward
/// for one `can_compact`-compatible with it. On a hit: `Noop` drops both
/// (the candidate is removed, the incoming record discarded); `Merged`
/// replaces the candidate's op in place and discards the incoming record.
/// On a miss, the incoming record is prepended as a new most-recent entry.
/// The accumulator is reversed at the end to restore chronological order.
pub fn compact_group(
    ccrdt_type: &dyn CcrdtType,
    records: Vec<LogRecord>,
    stats: &mut CompactionStats,
) -> Vec<LogRecord> {
    let mut acc: Vec<LogRecord> = Vec::new();

    for newer in records.into_iter() {
        let newer_op = op_of(&newer);
        let mut candidate: Option<(usize, CompactOutcome)> = None;
        for (i, older) in acc.iter().enumerate() {
            let older_op = op_of(older);
            if ccrdt_type.can_compact(older_op, newer_op) {
                candidate = Some((i, ccrdt_type.compact(older_op, newer_op)));
                break;
            }
        }
        match candidate {
            Some((i, CompactOutcome::Noop)) => {
                acc.remove(i);
                stats.records_cancelled += 1;
            }
            Some((i, CompactOutcome::Merged(merged_op))) => {
                set_op(&mut acc[i], merged_op);
                stats.records_merged += 1;
            }
            None => acc.insert(0, newer),
        }
    }

    acc.reverse();
    acc
}

fn op_of(record: &LogRecord) -> &Op {
    match &record.log_operation.body {
        OpBody::Update { op, .. } => op,
        _ => unreachable!("ccrdt group contains only update records"),
    }
}

fn set_op(record: &mut LogRecord, op: Op) {
    match &mut record.log_operation.body {
        OpBody::Update { op: slot, .. } => *slot = op,
        _ => unreachable!("ccrdt group contains only update records"),
    }
}
