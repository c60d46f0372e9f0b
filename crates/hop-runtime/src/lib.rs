//! Capability interfaces consumed by the hop catalogs and the switch orchestrator.
//!
//! Everything that touches the outside world (persistence, the `op` CLI, UI
//! automation) sits behind one of the traits below so the store and the
//! orchestrator stay testable with in-process fakes.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("command failed: {0}")]
    Failed(String),
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CapabilityError {
    fn from(err: std::io::Error) -> Self {
        CapabilityError::Io(err.to_string())
    }
}

/// Opaque string blob persistence, one value per key.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CapabilityError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), CapabilityError>;
}

/// Reads a one-time code for an opaque secret reference.
#[async_trait::async_trait]
pub trait OtpReader: Send + Sync {
    fn id(&self) -> &'static str;

    /// Version string of the backing tool; used as an availability probe.
    async fn version(&self) -> Result<String, CapabilityError>;

    /// Returns the trimmed code. Failures carry the tool's diagnostic text.
    async fn read(&self, reference: &str) -> Result<String, CapabilityError>;
}

/// Moves UI focus to a named context (workspace / space).
///
/// `Ok(false)` is a soft failure: the automation ran but could not find or
/// focus the context.
#[async_trait::async_trait]
pub trait ContextSwitcher: Send + Sync {
    fn id(&self) -> &'static str;

    async fn switch_to(&self, context: &str) -> Result<bool, CapabilityError>;
}

/// Selects the item at `index` (1-based) inside the focused context using a
/// keyboard shortcut built from `modifier_key`.
#[async_trait::async_trait]
pub trait TabSelector: Send + Sync {
    fn id(&self) -> &'static str;

    async fn select(&self, index: u32, modifier_key: &str) -> Result<bool, CapabilityError>;
}

pub type BoxedSwitcher = Box<dyn ContextSwitcher>;
pub type BoxedSelector = Box<dyn TabSelector>;

/// Result of a single fallible step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success,
    SoftFailure,
    HardFailure { error: String },
}

impl StepOutcome {
    /// Collapses a capability result into the tri-state outcome.
    pub fn from_result(result: Result<bool, CapabilityError>) -> Self {
        match result {
            Ok(true) => StepOutcome::Success,
            Ok(false) => StepOutcome::SoftFailure,
            Err(err) => StepOutcome::HardFailure {
                error: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Success => "success",
            StepOutcome::SoftFailure => "soft_failure",
            StepOutcome::HardFailure { .. } => "hard_failure",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            StepOutcome::Success => "Succeeded",
            StepOutcome::SoftFailure => "Did not succeed",
            StepOutcome::HardFailure { .. } => "Errored",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StepOutcome::HardFailure { error } => Some(error.as_str()),
            _ => None,
        }
    }
}
