use crate::record::{alias_key, AliasRecord, Target};

/// Outcome of an exact alias lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a, T> {
    Found(&'a AliasRecord<T>),
    NotFound,
    /// The catalog holds no records at all.
    Empty,
}

impl<'a, T> Resolution<'a, T> {
    pub fn found(self) -> Option<&'a AliasRecord<T>> {
        match self {
            Resolution::Found(record) => Some(record),
            _ => None,
        }
    }
}

/// Case-insensitive exact lookup; the first match wins.
pub fn resolve<'a, T: Target>(records: &'a [AliasRecord<T>], alias: &str) -> Resolution<'a, T> {
    if records.is_empty() {
        return Resolution::Empty;
    }
    let wanted = alias_key(alias);
    records
        .iter()
        .find(|record| record.key() == wanted)
        .map(Resolution::Found)
        .unwrap_or(Resolution::NotFound)
}

/// Substring filter for browsing. A blank query returns everything.
/// Results follow the catalog's listing order.
pub fn search<'a, T: Target>(records: &'a [AliasRecord<T>], query: &str) -> Vec<&'a AliasRecord<T>> {
    let needle = query.trim().to_lowercase();
    let mut hits: Vec<&AliasRecord<T>> = records
        .iter()
        .filter(|record| {
            needle.is_empty()
                || record.alias.to_lowercase().contains(&needle)
                || record
                    .target
                    .search_terms()
                    .iter()
                    .any(|term| term.contains(&needle))
        })
        .collect();
    hits.sort_by(|a, b| a.target.listing_order(&b.target));
    hits
}
