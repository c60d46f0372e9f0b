//! Alias catalogs: records, persistence, import parsing, merge and lookup.
//!
//! Both catalogs (OTP references and workspace tabs) share one generic
//! [`AliasRecord`] parameterized by a [`Target`] variant.

pub mod kv;
pub mod merge;
pub mod otp;
pub mod parse;
pub mod record;
pub mod resolve;
pub mod store;
pub mod tabs;

pub use kv::{FileKv, MemoryKv};
pub use merge::{dedupe, export, merge, merge_with_stats, MergeStats};
pub use otp::{ReferenceTarget, OTP_ATTRIBUTE_SUFFIX, REFERENCE_PREFIX};
pub use parse::parse_import;
pub use record::{alias_key, new_id, validate_alias, AliasRecord, Target, ValidationError};
pub use resolve::{resolve, search, Resolution};
pub use store::{ImportReport, RecordStore, StoreError};
pub use tabs::{parse_selector, split_keywords, ContextSelectorTarget};

pub type OtpRecord = AliasRecord<ReferenceTarget>;
pub type TabRecord = AliasRecord<ContextSelectorTarget>;
pub type OtpStore = RecordStore<ReferenceTarget>;
pub type TabStore = RecordStore<ContextSelectorTarget>;
