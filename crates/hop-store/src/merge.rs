use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::record::{new_id, AliasRecord, Target};

/// Counts produced while merging an incoming set into an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub updated: usize,
    pub inserted: usize,
}

/// Merges `incoming` into `existing` keyed by lower-cased alias.
///
/// Matching records keep their id and alias spelling and take the incoming
/// target. Unmatched incoming records are appended with a fresh id. Existing
/// records come first in their original order, then insertions in incoming
/// order.
pub fn merge<T: Target>(
    existing: Vec<AliasRecord<T>>,
    incoming: Vec<AliasRecord<T>>,
) -> Vec<AliasRecord<T>> {
    merge_with_stats(existing, incoming).0
}

pub fn merge_with_stats<T: Target>(
    existing: Vec<AliasRecord<T>>,
    incoming: Vec<AliasRecord<T>>,
) -> (Vec<AliasRecord<T>>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut out: Vec<AliasRecord<T>> = Vec::with_capacity(existing.len() + incoming.len());
    let mut by_key: HashMap<String, usize> = HashMap::new();

    // Duplicate aliases already in the store collapse onto their first entry.
    for record in existing {
        let key = record.key();
        if by_key.contains_key(&key) {
            continue;
        }
        by_key.insert(key, out.len());
        out.push(record);
    }

    for record in incoming {
        let key = record.key();
        match by_key.get(&key) {
            Some(&idx) => {
                out[idx].target = record.target;
                stats.updated += 1;
            }
            None => {
                by_key.insert(key, out.len());
                out.push(AliasRecord {
                    id: new_id(),
                    alias: record.alias,
                    target: record.target,
                });
                stats.inserted += 1;
            }
        }
    }

    (out, stats)
}

/// Keeps the first record for each case-insensitive alias, preserving order.
pub fn dedupe<T: Target>(records: Vec<AliasRecord<T>>) -> Vec<AliasRecord<T>> {
    let mut seen: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect()
}

/// Pretty-printed JSON of the minimal projection (no ids), re-importable.
pub fn export<T: Target>(records: &[AliasRecord<T>]) -> String {
    let minimal: Vec<T::Entry> = records.iter().map(|r| r.to_entry()).collect();
    serde_json::to_string_pretty(&minimal).unwrap_or_else(|_| "[]".to_string())
}
