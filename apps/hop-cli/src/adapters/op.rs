use std::time::Duration;

use hop_core::tool_path::resolve_op_path;
use hop_core::Settings;
use hop_runtime::{CapabilityError, OtpReader};

use super::run_process;

/// 1Password CLI reader: `op read <reference>`.
#[derive(Debug, Clone)]
pub struct OpCli {
    program: String,
    timeout: Duration,
}

impl OpCli {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            resolve_op_path(settings.op_path.as_deref()),
            Duration::from_secs(settings.op_timeout_secs),
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait::async_trait]
impl OtpReader for OpCli {
    fn id(&self) -> &'static str {
        "op"
    }

    async fn version(&self) -> Result<String, CapabilityError> {
        run_process(&self.program, &["--version"], self.timeout).await
    }

    async fn read(&self, reference: &str) -> Result<String, CapabilityError> {
        tracing::debug!(program = %self.program, "reading one-time code");
        run_process(&self.program, &["read", reference], self.timeout).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_OP: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "2.30.0" ;;
  read)
    case "$2" in
      *slow*) sleep 5 ;;
      *missing*) echo "[ERROR] item not found" >&2; exit 1 ;;
      *silent*) exit 3 ;;
      *) echo "  123456  " ;;
    esac ;;
  *) exit 2 ;;
esac
"#;

    fn fake_op(dir: &std::path::Path) -> String {
        let path = dir.join("op");
        std::fs::write(&path, FAKE_OP).expect("write fake op");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake op");
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    #[serial]
    async fn reads_trimmed_code_and_version() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let op = OpCli::new(fake_op(tmp.path()), Duration::from_secs(5));
        assert_eq!(op.version().await.expect("version"), "2.30.0");
        assert_eq!(
            op.read("op://V/I/F?attribute=otp").await.expect("code"),
            "123456"
        );
    }

    #[tokio::test]
    #[serial]
    async fn failures_surface_stderr_or_status() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let op = OpCli::new(fake_op(tmp.path()), Duration::from_secs(5));
        assert_eq!(
            op.read("op://V/missing/F").await,
            Err(CapabilityError::Failed("[ERROR] item not found".into()))
        );
        match op.read("op://V/silent/F").await {
            Err(CapabilityError::Failed(detail)) => assert!(detail.contains("exited with")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn slow_reads_time_out() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let op = OpCli::new(fake_op(tmp.path()), Duration::from_secs(1));
        assert_eq!(
            op.read("op://V/slow/F").await,
            Err(CapabilityError::Timeout(1))
        );
    }

    #[tokio::test]
    #[serial]
    async fn missing_binary_is_unavailable() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let op = OpCli::new(
            tmp.path().join("no-such-op").to_string_lossy().to_string(),
            Duration::from_secs(1),
        );
        assert!(matches!(
            op.version().await,
            Err(CapabilityError::Unavailable(_))
        ));
    }
}
