//! Process-backed implementations of the hop capability traits.

pub mod op;
pub mod osascript;

pub use op::OpCli;
pub use osascript::{KeystrokeSelector, MenuSwitcher, Osascript, ScriptSwitcher};

use std::time::Duration;

use hop_runtime::CapabilityError;
use tokio::time::timeout;

/// Runs `program args..` and returns trimmed stdout.
///
/// Non-zero exits become [`CapabilityError::Failed`] carrying stderr (or the
/// exit status when stderr is empty); a missing executable is
/// [`CapabilityError::Unavailable`].
pub(crate) async fn run_process(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> Result<String, CapabilityError> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).kill_on_drop(true);
    let output = match timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(CapabilityError::Unavailable(format!("{program}: {err}")));
        }
        Ok(Err(err)) => return Err(err.into()),
        Err(_) => return Err(CapabilityError::Timeout(limit.as_secs())),
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            format!("{program} exited with {}", output.status)
        } else {
            stderr
        };
        return Err(CapabilityError::Failed(detail));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
