use std::marker::PhantomData;
use std::sync::Arc;

use hop_runtime::{CapabilityError, KeyValueStore};
use serde::Serialize;
use serde_json::Value;

use crate::merge::{export, merge_with_stats};
use crate::parse::parse_import;
use crate::record::{AliasRecord, Target};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to read {key}: {source}")]
    Read {
        key: &'static str,
        #[source]
        source: CapabilityError,
    },
    #[error("failed to write {key}: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: CapabilityError,
    },
    #[error("failed to encode {key}: {message}")]
    Encode { key: &'static str, message: String },
}

/// Summary of an import: how many records the text yielded and how they
/// landed in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub parsed: usize,
    pub updated: usize,
    pub inserted: usize,
}

/// Whole-collection CRUD over one catalog blob.
///
/// Every mutation is a load-modify-save of the full collection; there is no
/// optimistic concurrency check, the last save wins.
pub struct RecordStore<T> {
    kv: Arc<dyn KeyValueStore>,
    seed: Option<String>,
    _target: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            kv: self.kv.clone(),
            seed: self.seed.clone(),
            _target: PhantomData,
        }
    }
}

impl<T: Target> RecordStore<T> {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            seed: None,
            _target: PhantomData,
        }
    }

    /// Text consulted once, only while nothing has been persisted yet.
    pub fn with_seed(mut self, seed: Option<String>) -> Self {
        self.seed = seed.filter(|s| !s.trim().is_empty());
        self
    }

    pub async fn load(&self) -> Result<Vec<AliasRecord<T>>, StoreError> {
        let raw = self
            .kv
            .get(T::STORAGE_KEY)
            .await
            .map_err(|source| StoreError::Read {
                key: T::STORAGE_KEY,
                source,
            })?;

        if let Some(raw) = raw.filter(|r| !r.is_empty()) {
            return Ok(decode::<T>(&raw));
        }

        let Some(seed) = self.seed.as_deref() else {
            return Ok(Vec::new());
        };
        let seeded = parse_import::<T>(seed);
        if seeded.is_empty() {
            tracing::warn!(catalog = T::CATALOG, "seed text produced no records");
            return Ok(Vec::new());
        }
        tracing::info!(catalog = T::CATALOG, count = seeded.len(), "seeding catalog");
        self.save(seeded).await
    }

    /// Normalizes and persists the full collection, returning what was written.
    pub async fn save(
        &self,
        records: Vec<AliasRecord<T>>,
    ) -> Result<Vec<AliasRecord<T>>, StoreError> {
        let normalized: Vec<AliasRecord<T>> =
            records.into_iter().map(AliasRecord::normalized).collect();
        let text = serde_json::to_string(&normalized).map_err(|err| StoreError::Encode {
            key: T::STORAGE_KEY,
            message: err.to_string(),
        })?;
        self.kv
            .set(T::STORAGE_KEY, &text)
            .await
            .map_err(|source| StoreError::Write {
                key: T::STORAGE_KEY,
                source,
            })?;
        tracing::debug!(catalog = T::CATALOG, count = normalized.len(), "saved catalog");
        Ok(normalized)
    }

    /// Appends a record with a fresh id. Alias collisions are not checked.
    pub async fn add(&self, alias: &str, target: T) -> Result<AliasRecord<T>, StoreError> {
        let mut records = self.load().await?;
        let record = AliasRecord::new(alias, target).normalized();
        records.push(record.clone());
        self.save(records).await?;
        Ok(record)
    }

    /// Replaces the record with the same id. Returns `false` (and writes
    /// nothing) when no record has that id.
    pub async fn update(&self, record: AliasRecord<T>) -> Result<bool, StoreError> {
        let mut records = self.load().await?;
        let Some(slot) = records.iter_mut().find(|r| r.id == record.id) else {
            return Ok(false);
        };
        *slot = record.normalized();
        self.save(records).await?;
        Ok(true)
    }

    /// Removes the record with `id`; the collection is persisted either way.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let records = self.load().await?;
        let before = records.len();
        let remaining: Vec<AliasRecord<T>> = records.into_iter().filter(|r| r.id != id).collect();
        let removed = remaining.len() != before;
        self.save(remaining).await?;
        Ok(removed)
    }

    /// Parses `text` and merges it into the catalog. Nothing is written when
    /// the text yields no records.
    pub async fn import(&self, text: &str) -> Result<ImportReport, StoreError> {
        let incoming = parse_import::<T>(text);
        if incoming.is_empty() {
            return Ok(ImportReport::default());
        }
        let parsed = incoming.len();
        let existing = self.load().await?;
        let (merged, stats) = merge_with_stats(existing, incoming);
        self.save(merged).await?;
        let report = ImportReport {
            parsed,
            updated: stats.updated,
            inserted: stats.inserted,
        };
        tracing::info!(
            target: "hop.audit",
            catalog = T::CATALOG,
            parsed = report.parsed,
            updated = report.updated,
            inserted = report.inserted,
            "catalog import"
        );
        Ok(report)
    }

    pub async fn export(&self) -> Result<String, StoreError> {
        Ok(export(&self.load().await?))
    }
}

// Unreadable blobs decode to an empty collection; the next save overwrites them.
fn decode<T: Target>(raw: &str) -> Vec<AliasRecord<T>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(AliasRecord::<T>::from_stored)
            .collect(),
        Ok(_) => {
            tracing::warn!(catalog = T::CATALOG, "stored catalog is not an array; ignoring");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(catalog = T::CATALOG, %err, "stored catalog is corrupt; ignoring");
            Vec::new()
        }
    }
}
