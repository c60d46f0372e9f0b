use hop_events::kinds;
use hop_runtime::StepOutcome;
use serde::Serialize;

/// Steps of a workspace switch, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ContextPrimary,
    ContextFallback,
    Settle,
    Select,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ContextPrimary => "context_primary",
            Stage::ContextFallback => "context_fallback",
            Stage::Settle => "settle",
            Stage::Select => "select",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            Stage::ContextPrimary => "Switch workspace (menu)",
            Stage::ContextFallback => "Switch workspace (script)",
            Stage::Settle => "Wait for workspace",
            Stage::Select => "Select tab",
        }
    }

    pub fn event_kind(&self) -> &'static str {
        match self {
            Stage::ContextPrimary => kinds::SWITCH_CONTEXT_PRIMARY,
            Stage::ContextFallback => kinds::SWITCH_CONTEXT_FALLBACK,
            Stage::Settle => kinds::SWITCH_SETTLE,
            Stage::Select => kinds::SWITCH_SELECT,
        }
    }
}

/// What one executed stage did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Id of the capability that ran the stage.
    pub strategy: String,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    Opened,
    SelectionFailed,
    ContextSwitchFailed,
    /// Another switch was already in flight; nothing ran.
    Busy,
}

impl SwitchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchOutcome::Opened => "opened",
            SwitchOutcome::SelectionFailed => "selection_failed",
            SwitchOutcome::ContextSwitchFailed => "context_switch_failed",
            SwitchOutcome::Busy => "busy",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            SwitchOutcome::Opened => "Opened",
            SwitchOutcome::SelectionFailed => "Switched workspace, but failed to select tab",
            SwitchOutcome::ContextSwitchFailed => "Failed to switch workspace",
            SwitchOutcome::Busy => "A switch is already in progress",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SwitchOutcome::Opened)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchReport {
    pub context: String,
    pub selector: u32,
    pub outcome: SwitchOutcome,
    pub stages: Vec<StageReport>,
}

impl SwitchReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }
}
