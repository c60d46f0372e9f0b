use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::{Target, ValidationError};

/// Scheme every 1Password secret reference starts with.
pub const REFERENCE_PREFIX: &str = "op://";
/// Query suffix asking `op read` for the current TOTP code.
pub const OTP_ATTRIBUTE_SUFFIX: &str = "?attribute=otp";

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"^\s*(.+?)\s*=\s*({}.*)\s*$", regex::escape(REFERENCE_PREFIX));
    Regex::new(&pattern).expect("valid line pattern")
});

/// Opaque secret reference resolved by an external OTP reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceTarget {
    pub reference: String,
}

impl ReferenceTarget {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// Cleans a reference typed or pasted by a user: quotes are stripped and
    /// the OTP attribute query is appended when missing.
    pub fn from_input(raw: &str) -> Result<Self, ValidationError> {
        let mut reference = raw.trim().replace('"', "");
        if reference.is_empty() {
            return Err(ValidationError::MissingField("reference"));
        }
        if !reference.ends_with(OTP_ATTRIBUTE_SUFFIX) {
            reference.push_str(OTP_ATTRIBUTE_SUFFIX);
        }
        Ok(Self { reference })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpEntry {
    pub label: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Target for ReferenceTarget {
    const STORAGE_KEY: &'static str = "otp_pairs";
    const CATALOG: &'static str = "otp";

    type Entry = OtpEntry;

    fn to_entry(alias: &str, target: &Self) -> OtpEntry {
        OtpEntry {
            label: alias.to_string(),
            reference: target.reference.clone(),
        }
    }

    fn from_entry(entry: OtpEntry) -> Option<(String, Self)> {
        let label = entry.label.trim();
        let reference = entry.reference.trim();
        if label.is_empty() || reference.is_empty() {
            return None;
        }
        Some((label.to_string(), ReferenceTarget::new(reference)))
    }

    fn normalize(&mut self) {
        self.reference = self.reference.trim().to_string();
    }

    fn parse_lines(text: &str) -> Vec<(String, Self)> {
        text.lines()
            .filter_map(|line| {
                let caps = LINE_PATTERN.captures(line)?;
                let label = caps.get(1)?.as_str().trim();
                let reference = caps.get(2)?.as_str().trim();
                if label.is_empty() || reference.is_empty() {
                    return None;
                }
                Some((label.to_string(), ReferenceTarget::new(reference)))
            })
            .collect()
    }

    fn describe(&self) -> String {
        self.reference.clone()
    }
}
