use std::cmp::Ordering;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Catalog-specific payload of an [`AliasRecord`].
///
/// Each implementation owns its wire format (`Entry`, the minimal
/// projection without `id`), its normalization and, optionally, a
/// line-based import syntax.
pub trait Target: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Key of the persisted blob holding this catalog.
    const STORAGE_KEY: &'static str;
    /// Short catalog name used in logs and CLI output.
    const CATALOG: &'static str;
    /// Whether persisted elements lacking an `id` are discarded on load.
    /// When `false`, such elements are kept and given a fresh id.
    const REQUIRE_STORED_ID: bool = true;

    type Entry: Serialize + DeserializeOwned;

    fn to_entry(alias: &str, target: &Self) -> Self::Entry;

    /// Returns `None` when a required field is missing or invalid.
    fn from_entry(entry: Self::Entry) -> Option<(String, Self)>;

    fn normalize(&mut self);

    fn parse_lines(_text: &str) -> Vec<(String, Self)> {
        Vec::new()
    }

    /// Extra lower-cased terms matched by `search`, besides the alias.
    fn search_terms(&self) -> Vec<String> {
        Vec::new()
    }

    fn listing_order(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }

    /// One-line human description of where the alias points.
    fn describe(&self) -> String;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasRecord<T> {
    pub id: String,
    pub alias: String,
    pub target: T,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lower-cased, trimmed identity key used by merge, dedupe and resolve.
pub fn alias_key(alias: &str) -> String {
    alias.trim().to_lowercase()
}

impl<T: Target> AliasRecord<T> {
    /// Creates a record with a freshly generated id.
    pub fn new(alias: impl Into<String>, target: T) -> Self {
        Self {
            id: new_id(),
            alias: alias.into(),
            target,
        }
    }

    pub fn key(&self) -> String {
        alias_key(&self.alias)
    }

    /// Trims text fields and assigns an id when missing.
    pub fn normalize(&mut self) {
        if self.id.trim().is_empty() {
            self.id = new_id();
        }
        self.alias = self.alias.trim().to_string();
        self.target.normalize();
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn to_entry(&self) -> T::Entry {
        T::to_entry(&self.alias, &self.target)
    }

    /// Decodes one persisted element. Invalid payloads are rejected, and so
    /// are id-less entries when the catalog requires stored ids.
    pub(crate) fn from_stored(value: Value) -> Option<Self> {
        let stored: Stored<T::Entry> = serde_json::from_value(value).ok()?;
        if stored.id.trim().is_empty() && T::REQUIRE_STORED_ID {
            return None;
        }
        let (alias, target) = T::from_entry(stored.entry)?;
        Some(
            Self {
                id: stored.id,
                alias,
                target,
            }
            .normalized(),
        )
    }
}

#[derive(Serialize, Deserialize)]
struct Stored<E> {
    #[serde(default)]
    id: String,
    #[serde(flatten)]
    entry: E,
}

impl<T: Target> Serialize for AliasRecord<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Stored {
            id: self.id.clone(),
            entry: self.to_entry(),
        }
        .serialize(serializer)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("tab index must be a positive number, got {0:?}")]
    InvalidIndex(String),
}

/// Checks a user-supplied alias and returns it trimmed.
pub fn validate_alias(raw: &str) -> Result<String, ValidationError> {
    let alias = raw.trim();
    if alias.is_empty() {
        return Err(ValidationError::MissingField("alias"));
    }
    Ok(alias.to_string())
}
