//! Configuration, paths and the two user-facing flows built on the catalogs:
//! fetching a one-time code and switching to a workspace tab.

use std::path::{Path, PathBuf};

mod config;
pub use config::{
    config_schema_json, load_config, parse_config, write_schema_file, Config, OtpConfig,
    Settings, StorageConfig, TabsConfig, DEFAULT_MODIFIER_KEY, DEFAULT_OP_TIMEOUT_SECS,
    DEFAULT_SETTLE_MS,
};
pub mod orchestrator;
pub mod otp;
pub mod tool_path;
pub mod util;

/// Config file name looked up next to the executable and in the config dir.
pub const CONFIG_FILE: &str = "hop.toml";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "hop", "hop")
}

/// Per-user data directory, falling back to `$HOME/.hop` and then `./.hop`.
pub fn default_state_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.data_local_dir().to_path_buf())
        .or_else(|| std::env::var("HOME").ok().map(|h| Path::new(&h).join(".hop")))
        .unwrap_or_else(|| PathBuf::from(".hop"))
}

/// Logs directory from the environment, else `<state_dir>/logs`.
///
/// Does not read the config file; used before tracing is installed.
pub fn logs_dir() -> PathBuf {
    util::env_string("HOP_LOGS_DIR")
        .map(|s| PathBuf::from(expand_vars(&s)))
        .unwrap_or_else(|| {
            util::env_string("HOP_STATE_DIR")
                .map(|s| PathBuf::from(expand_vars(&s)))
                .unwrap_or_else(default_state_dir)
                .join("logs")
        })
}

/// Expands `%VAR%` and `$VAR` references and normalizes separators.
pub fn expand_vars(raw: &str) -> String {
    let mut s = raw.to_string();
    for (k, v) in std::env::vars() {
        let p1 = format!("%{}%", k);
        let p2 = format!("${}", k);
        if s.contains(&p1) {
            s = s.replace(&p1, &v);
        }
        if s.contains(&p2) {
            s = s.replace(&p2, &v);
        }
    }
    s.replace('\\', "/")
}

/// Resolve a config file path independent of the current working directory.
///
/// Search order (first existing wins):
/// - `HOP_CONFIG_DIR` environment variable if set (joined with `rel`)
/// - Directory of the current executable (joined with `rel`)
/// - Parent of the executable directory (joined with `rel`)
/// - Current working directory (joined with `rel`)
///
/// If `rel` is absolute, it is returned if it exists.
pub fn resolve_config_path(rel: &str) -> Option<PathBuf> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return rel_path.exists().then(|| rel_path.to_path_buf());
    }

    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(cfg_dir) = util::env_string("HOP_CONFIG_DIR") {
        candidates.push(PathBuf::from(cfg_dir));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.to_path_buf());
            if let Some(parent) = exe_dir.parent() {
                candidates.push(parent.to_path_buf());
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }

    candidates
        .into_iter()
        .map(|base| base.join(rel))
        .find(|p| p.exists())
}

/// Config file in effect: `HOP_CONFIG`, else [`resolve_config_path`], else the
/// per-user config directory. `None` when no file exists.
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = util::env_string("HOP_CONFIG") {
        return Some(PathBuf::from(explicit));
    }
    resolve_config_path(CONFIG_FILE).or_else(|| {
        project_dirs()
            .map(|p| p.config_dir().join(CONFIG_FILE))
            .filter(|p| p.exists())
    })
}

/// Effective paths as JSON. An invalid config file is logged and ignored.
pub fn effective_paths() -> serde_json::Value {
    let path = config_path();
    let cfg = path.as_deref().and_then(|p| match load_config(p) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::error!("{:#}", e);
            None
        }
    });
    let settings = Settings::from_config(&cfg.unwrap_or_default(), path.clone());
    let config_dir = project_dirs().map(|p| p.config_dir().to_string_lossy().replace('\\', "/"));

    serde_json::json!({
        "config_path": path.map(|p| p.to_string_lossy().replace('\\', "/")),
        "config_dir": config_dir,
        "state_dir": settings.state_dir.to_string_lossy().replace('\\', "/"),
        "logs_dir": settings.logs_dir.to_string_lossy().replace('\\', "/"),
    })
}
