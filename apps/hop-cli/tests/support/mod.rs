#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

const HOP_ENV: &[&str] = &[
    "HOP_CONFIG_DIR",
    "HOP_LOGS_DIR",
    "HOP_OP_PATH",
    "HOP_OP_TIMEOUT_SECS",
    "HOP_OTP_SEED",
    "HOP_TABS_SEED",
    "HOP_USE_UI_SCRIPTING",
    "HOP_TAB_MODIFIER_KEY",
    "HOP_SETTLE_MS",
    "HOP_AUDIT_LOG_ROLL",
];

/// Isolated state + config directory for one test.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("hop.toml"), "").expect("write config");
        Self { dir }
    }

    pub fn state_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("state")
    }

    pub fn hop(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("hop").expect("binary");
        for key in HOP_ENV {
            cmd.env_remove(key);
        }
        cmd.env("HOP_CONFIG", self.dir.path().join("hop.toml"))
            .env("HOP_STATE_DIR", self.state_dir())
            .env("RUST_LOG", "off");
        cmd
    }

    pub fn write(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }
}

pub fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[cfg(unix)]
pub fn fake_op(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("op");
    std::fs::write(
        &path,
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo 2.30.0; exit 0; fi\n\
         if [ \"$1\" = \"read\" ]; then echo 123456; exit 0; fi\nexit 2\n",
    )
    .expect("write fake op");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}
