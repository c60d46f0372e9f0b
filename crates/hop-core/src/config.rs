use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::util::{env_bool, env_string};

pub const DEFAULT_MODIFIER_KEY: &str = "command";
pub const DEFAULT_SETTLE_MS: u64 = 300;
pub const DEFAULT_OP_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct StorageConfig {
    /// Directory holding one `<key>.json` blob per catalog.
    #[serde(default)]
    pub state_dir: Option<String>,
    #[serde(default)]
    pub logs_dir: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct OtpConfig {
    /// Explicit path to the 1Password CLI; probed before the standard locations.
    #[serde(default)]
    pub op_path: Option<String>,
    /// Seconds before an `op` invocation is abandoned.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Seed text used once while the OTP catalog has never been saved.
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct TabsConfig {
    /// Try the menu-bar click before the scripting fallback.
    #[serde(default)]
    pub use_ui_scripting: Option<bool>,
    /// Modifier held while typing the tab index, e.g. "command" or "control".
    #[serde(default)]
    pub modifier_key: Option<String>,
    #[serde(default)]
    pub settle_ms: Option<u64>,
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub tabs: TabsConfig,
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema_value = config_schema_json();
    validator_for(&schema_value).expect("valid schema")
});

/// Returns the JSON schema describing the configuration structure.
///
/// # Panics
///
/// Panics if schema generation fails; this indicates a programming error.
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(Config);
    serde_json::to_value(&schema).expect("schema json")
}

pub fn write_schema_file(path: &Path) -> std::io::Result<()> {
    let schema_json = config_schema_json();
    std::fs::write(path, serde_json::to_string_pretty(&schema_json)?)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)?;
    let json_value = serde_json::to_value(&raw)?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| e.to_string())
        .collect();
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(validation_errors.join(", ")));
    }
    let cfg: Config = toml::from_str(content)?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Resolved, defaulted view of the configuration with environment overrides
/// applied.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Settings {
    pub config_path: Option<PathBuf>,
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub op_path: Option<String>,
    pub op_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_seed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs_seed: Option<String>,
    pub use_ui_scripting: bool,
    pub modifier_key: String,
    pub settle_ms: u64,
}

impl Settings {
    /// Loads the config file (if any) and overlays the environment. A broken
    /// config file is an error.
    pub fn load() -> Result<Self> {
        let path = crate::config_path();
        let cfg = match path.as_deref() {
            Some(p) => load_config(p)?,
            None => Config::default(),
        };
        Ok(Self::from_config(&cfg, path))
    }

    pub fn from_config(cfg: &Config, config_path: Option<PathBuf>) -> Self {
        let state_dir = env_string("HOP_STATE_DIR")
            .or_else(|| cfg.storage.state_dir.clone())
            .map(|s| PathBuf::from(crate::expand_vars(&s)))
            .unwrap_or_else(crate::default_state_dir);
        let logs_dir = env_string("HOP_LOGS_DIR")
            .or_else(|| cfg.storage.logs_dir.clone())
            .map(|s| PathBuf::from(crate::expand_vars(&s)))
            .unwrap_or_else(|| state_dir.join("logs"));
        let op_timeout_secs = env_string("HOP_OP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .or(cfg.otp.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_OP_TIMEOUT_SECS);
        let settle_ms = env_string("HOP_SETTLE_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .or(cfg.tabs.settle_ms)
            .unwrap_or(DEFAULT_SETTLE_MS);

        Self {
            config_path,
            state_dir,
            logs_dir,
            op_path: env_string("HOP_OP_PATH").or_else(|| cfg.otp.op_path.clone()),
            op_timeout_secs,
            otp_seed: env_string("HOP_OTP_SEED").or_else(|| cfg.otp.seed.clone()),
            tabs_seed: env_string("HOP_TABS_SEED").or_else(|| cfg.tabs.seed.clone()),
            use_ui_scripting: env_bool("HOP_USE_UI_SCRIPTING")
                .or(cfg.tabs.use_ui_scripting)
                .unwrap_or(false),
            modifier_key: env_string("HOP_TAB_MODIFIER_KEY")
                .or_else(|| cfg.tabs.modifier_key.clone())
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| DEFAULT_MODIFIER_KEY.to_string()),
            settle_ms,
        }
    }
}
