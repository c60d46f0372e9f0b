use std::time::Duration;

use hop_runtime::{CapabilityError, ContextSwitcher, TabSelector};

use super::run_process;

/// Browser process driven by the scripts below.
pub const BROWSER_PROCESS: &str = "Arc";

const OSASCRIPT: &str = "osascript";
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Escapes text for use inside an AppleScript string literal.
pub fn escape_applescript(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Clicks the workspace entry in the browser's Spaces menu.
pub fn menu_switch_script(workspace: &str) -> String {
    format!(
        r#"tell application "System Events"
  tell process "{process}"
    set frontmost to true
    try
      click menu item "{workspace}" of menu 1 of menu bar item 6 of menu bar 1
      return true
    on error
      return false
    end try
  end tell
end tell"#,
        process = BROWSER_PROCESS,
        workspace = escape_applescript(workspace),
    )
}

/// Focuses the first space with a matching title via the browser's scripting
/// dictionary.
pub fn space_focus_script(workspace: &str) -> String {
    format!(
        r#"tell application "{process}"
  activate
  tell front window
    try
      set targetSpace to first space whose title is "{workspace}"
      tell targetSpace to focus
      return true
    on error
      return false
    end try
  end tell
end tell"#,
        process = BROWSER_PROCESS,
        workspace = escape_applescript(workspace),
    )
}

/// Types the tab index while holding `modifier_key` (e.g. "command").
pub fn keystroke_script(index: u32, modifier_key: &str) -> String {
    format!(
        r#"tell application "System Events"
  tell process "{process}"
    set frontmost to true
    delay 0.1
    keystroke "{index}" using {{{modifier} down}}
    return true
  end tell
end tell"#,
        process = BROWSER_PROCESS,
        modifier = modifier_key.trim().to_lowercase(),
    )
}

/// `osascript -e <script>` runner shared by the UI adapters.
#[derive(Debug, Clone)]
pub struct Osascript {
    program: String,
    timeout: Duration,
}

impl Default for Osascript {
    fn default() -> Self {
        Self {
            program: OSASCRIPT.to_string(),
            timeout: SCRIPT_TIMEOUT,
        }
    }
}

impl Osascript {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub async fn run(&self, script: &str) -> Result<String, CapabilityError> {
        run_process(&self.program, &["-e", script], self.timeout).await
    }

    // Scripts print `true` only when the switch happened.
    async fn run_flag(&self, script: &str) -> Result<bool, CapabilityError> {
        Ok(self.run(script).await?.trim() == "true")
    }
}

/// Primary strategy: System Events menu-bar click.
#[derive(Debug, Clone, Default)]
pub struct MenuSwitcher {
    runner: Osascript,
}

impl MenuSwitcher {
    pub fn new(runner: Osascript) -> Self {
        Self { runner }
    }
}

#[async_trait::async_trait]
impl ContextSwitcher for MenuSwitcher {
    fn id(&self) -> &'static str {
        "menu"
    }

    async fn switch_to(&self, context: &str) -> Result<bool, CapabilityError> {
        self.runner.run_flag(&menu_switch_script(context)).await
    }
}

/// Fallback strategy: the browser's own scripting dictionary.
#[derive(Debug, Clone, Default)]
pub struct ScriptSwitcher {
    runner: Osascript,
}

impl ScriptSwitcher {
    pub fn new(runner: Osascript) -> Self {
        Self { runner }
    }
}

#[async_trait::async_trait]
impl ContextSwitcher for ScriptSwitcher {
    fn id(&self) -> &'static str {
        "script"
    }

    async fn switch_to(&self, context: &str) -> Result<bool, CapabilityError> {
        self.runner.run_flag(&space_focus_script(context)).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeystrokeSelector {
    runner: Osascript,
}

impl KeystrokeSelector {
    pub fn new(runner: Osascript) -> Self {
        Self { runner }
    }
}

#[async_trait::async_trait]
impl TabSelector for KeystrokeSelector {
    fn id(&self) -> &'static str {
        "keystroke"
    }

    async fn select(&self, index: u32, modifier_key: &str) -> Result<bool, CapabilityError> {
        self.runner
            .run(&keystroke_script(index, modifier_key))
            .await
            .map(|_| true)
    }
}
