//! Group-by primitives shared by the analyzer queries.
//!
//! Groups are kept in discovery order so that ranking with a stable sort
//! breaks ties by first appearance.

use std::collections::HashMap;

use sales_core::models::{GroupTotal, SalesRecord, StatusCount};

// ── GroupAccumulator ──────────────────────────────────────────────────────────

/// Running sum and row count for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    pub sum: f64,
    pub rows: usize,
}

impl GroupAccumulator {
    /// Count a row; missing values add nothing to the sum.
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
        }
        self.rows += 1;
    }
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// Accumulators keyed by group name, remembering first-seen order.
#[derive(Debug, Default)]
struct Groups {
    order: Vec<(String, GroupAccumulator)>,
    index: HashMap<String, usize>,
}

impl Groups {
    fn entry(&mut self, key: &str) -> &mut GroupAccumulator {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.order.push((key.to_string(), GroupAccumulator::default()));
                self.index.insert(key.to_string(), self.order.len() - 1);
                self.order.len() - 1
            }
        };
        &mut self.order[slot].1
    }
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that partitions records by a text field.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Sum `value_fn` per distinct `key_fn`, in first-seen group order.
    ///
    /// Rows whose key is missing belong to no group and are skipped.
    pub fn sum_by<K, V>(records: &[SalesRecord], key_fn: K, value_fn: V) -> Vec<GroupTotal>
    where
        K: Fn(&SalesRecord) -> Option<&str>,
        V: Fn(&SalesRecord) -> Option<f64>,
    {
        Self::accumulate(records, key_fn, value_fn)
            .into_iter()
            .map(|(key, acc)| GroupTotal {
                key,
                value: acc.sum,
            })
            .collect()
    }

    /// Number of rows per distinct `key_fn`, in first-seen group order.
    pub fn count_by<K>(records: &[SalesRecord], key_fn: K) -> Vec<StatusCount>
    where
        K: Fn(&SalesRecord) -> Option<&str>,
    {
        Self::accumulate(records, key_fn, |_| None)
            .into_iter()
            .map(|(status, acc)| StatusCount {
                status,
                count: acc.rows,
            })
            .collect()
    }

    /// Sort groups by value, largest first.
    ///
    /// The sort is stable, so equal values keep their first-seen order.
    pub fn rank_descending(mut groups: Vec<GroupTotal>) -> Vec<GroupTotal> {
        groups.sort_by(|a, b| b.value.total_cmp(&a.value));
        groups
    }

    /// Sort counts largest first, ties in first-seen order.
    pub fn rank_counts(mut counts: Vec<StatusCount>) -> Vec<StatusCount> {
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    fn accumulate<K, V>(
        records: &[SalesRecord],
        key_fn: K,
        value_fn: V,
    ) -> Vec<(String, GroupAccumulator)>
    where
        K: Fn(&SalesRecord) -> Option<&str>,
        V: Fn(&SalesRecord) -> Option<f64>,
    {
        let mut groups = Groups::default();
        for record in records {
            if let Some(key) = key_fn(record) {
                groups.entry(key).add(value_fn(record));
            }
        }
        groups.order
    }
}

/// Arithmetic mean, or `None` when there are no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
