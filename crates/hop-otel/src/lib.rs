use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Target carrying one event per completed switch, OTP read and import.
pub const AUDIT_TARGET: &str = "hop.audit";

static AUDIT_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Installs the console subscriber with a `warn` default so command output
/// stays clean; `RUST_LOG` overrides.
pub fn init() {
    init_with_default("warn");
}

pub fn init_with_default(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(fmt_layer.with_filter(filter));

    match audit_settings() {
        Some(audit) => {
            if std::fs::create_dir_all(&audit.dir).is_err() {
                tracing::warn!(directory = %audit.dir.display(), "failed to create audit log directory");
            }
            let writer = match audit.rotation.as_str() {
                "hourly" => tracing_appender::rolling::hourly(&audit.dir, AUDIT_PREFIX),
                "minutely" => tracing_appender::rolling::minutely(&audit.dir, AUDIT_PREFIX),
                _ => tracing_appender::rolling::daily(&audit.dir, AUDIT_PREFIX),
            };
            let (nb, guard) = tracing_appender::non_blocking(writer);
            let _ = AUDIT_GUARD.set(guard);
            let targets = Targets::new().with_target(AUDIT_TARGET, tracing::Level::INFO);
            let audit_layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(nb)
                .with_filter(targets);
            let _ = registry.with(audit_layer).try_init();
        }
        None => {
            let _ = registry.try_init();
        }
    }
}

const AUDIT_PREFIX: &str = "hop-audit";

#[derive(Debug, PartialEq, Eq)]
struct AuditSettings {
    dir: PathBuf,
    rotation: String,
}

fn audit_settings() -> Option<AuditSettings> {
    if !hop_core::util::env_bool("HOP_AUDIT_LOG_ROLL").unwrap_or(false) {
        return None;
    }
    let dir = std::env::var("HOP_AUDIT_LOG_DIR")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(hop_core::logs_dir);
    let rotation = std::env::var("HOP_AUDIT_LOG_ROTATION")
        .map(|r| r.trim().to_lowercase())
        .unwrap_or_else(|_| "daily".into());
    Some(AuditSettings { dir, rotation })
}
