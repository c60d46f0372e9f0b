use serde_json::Value;

use crate::merge::dedupe;
use crate::record::{AliasRecord, Target};

/// Turns free-form seed or import text into records with fresh ids.
///
/// JSON arrays are tried first; a JSON array yielding at least one valid
/// element wins even if other elements were dropped. Otherwise the
/// catalog's line syntax is tried, deduplicated by alias. Malformed input
/// never errors, it just yields fewer (or no) records.
pub fn parse_import<T: Target>(text: &str) -> Vec<AliasRecord<T>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let from_json = parse_json_entries::<T>(trimmed);
    if !from_json.is_empty() {
        tracing::debug!(catalog = T::CATALOG, count = from_json.len(), "parsed JSON import");
        return from_json;
    }

    let from_lines: Vec<AliasRecord<T>> = T::parse_lines(trimmed)
        .into_iter()
        .map(|(alias, target)| AliasRecord::new(alias, target))
        .collect();
    tracing::debug!(catalog = T::CATALOG, count = from_lines.len(), "parsed line import");
    dedupe(from_lines)
}

fn parse_json_entries<T: Target>(text: &str) -> Vec<AliasRecord<T>> {
    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Vec::new(),
        Err(err) => {
            tracing::debug!(catalog = T::CATALOG, %err, "import text is not JSON");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<T::Entry>(item).ok())
        .filter_map(T::from_entry)
        .map(|(alias, target)| AliasRecord::new(alias, target))
        .collect()
}
