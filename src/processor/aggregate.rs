//! Group, rank and arg-max helpers shared by the aggregation queries.
//!
//! Every helper keeps first-encountered order: groups come out in the order
//! their key first appears, rankings use stable sorts and arg-max/arg-min
//! keep the earliest entry on ties.

use std::collections::HashMap;
use std::hash::Hash;

use crate::processor::{AggregateOp, AggregateResult};

#[derive(Debug, Clone, Default)]
struct Accumulator {
    rows: usize,
    count: usize,
    sum: f64,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.rows += 1;
        let Some(v) = value else {
            return;
        };
        self.count += 1;
        self.sum += v;
    }

    fn finish(&self, op: AggregateOp) -> Option<AggregateResult> {
        match op {
            AggregateOp::Sum => Some(AggregateResult::Float(self.sum)),
            AggregateOp::Count => Some(AggregateResult::Int(self.rows as i64)),
            AggregateOp::Avg => {
                (self.count > 0).then(|| AggregateResult::Float(self.sum / self.count as f64))
            }
        }
    }
}

/// Aggregates a stream of possibly-missing values.
///
/// `Sum` of nothing is 0 and `Count` counts every item, missing or not;
/// `Avg` is `None` when no value is present.
pub fn aggregate_values<I>(values: I, op: AggregateOp) -> Option<AggregateResult>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut acc = Accumulator::default();
    for v in values {
        acc.push(v);
    }
    acc.finish(op)
}

/// Mean of the present values
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    aggregate_values(values, AggregateOp::Avg).map(|r| r.as_f64())
}

/// Group-by in first-seen key order.
///
/// Items whose key is `None` are skipped. Groups whose aggregate is undefined
/// (e.g. `Avg` over only missing values) are omitted.
pub fn group_by<T, K, I>(
    items: I,
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> Option<f64>,
    op: AggregateOp,
) -> Vec<(K, AggregateResult)>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Accumulator)> = Vec::new();

    for item in items {
        let Some(k) = key(&item) else {
            continue;
        };
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Accumulator::default()));
            groups.len() - 1
        });
        groups[slot].1.push(value(&item));
    }

    groups
        .into_iter()
        .filter_map(|(k, acc)| acc.finish(op).map(|r| (k, r)))
        .collect()
}

/// Stable descending sort by score, truncated to `limit`.
///
/// Equal scores keep their incoming order.
pub fn rank_descending<T>(mut entries: Vec<(T, f64)>, limit: usize) -> Vec<(T, f64)> {
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.truncate(limit);
    entries
}

/// First entry with the largest score
pub fn arg_max<T: Clone>(entries: &[(T, f64)]) -> Option<(T, f64)> {
    let mut best: Option<&(T, f64)> = None;
    for entry in entries {
        if best.is_none_or(|b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.cloned()
}

/// First entry with the smallest score
pub fn arg_min<T: Clone>(entries: &[(T, f64)]) -> Option<(T, f64)> {
    let mut best: Option<&(T, f64)> = None;
    for entry in entries {
        if best.is_none_or(|b| entry.1 < b.1) {
            best = Some(entry);
        }
    }
    best.cloned()
}
