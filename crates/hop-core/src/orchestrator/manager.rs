use std::time::{Duration, Instant};

use hop_events::{kinds, Bus};
use hop_runtime::{BoxedSelector, BoxedSwitcher, CapabilityError, ContextSwitcher, StepOutcome};
use hop_store::ContextSelectorTarget;
use serde_json::json;

use super::guard::InFlightGuard;
use super::types::{Stage, StageReport, SwitchOutcome, SwitchReport};
use crate::config::{DEFAULT_MODIFIER_KEY, DEFAULT_SETTLE_MS};

/// Drives a workspace switch: primary context switch (optional), fallback
/// context switch, settle delay, then tab selection.
///
/// Stages run strictly in order and are never retried. Capability errors are
/// folded into the stage outcome, so [`Orchestrator::run`] always returns a
/// report.
pub struct Orchestrator {
    primary: Option<BoxedSwitcher>,
    fallback: BoxedSwitcher,
    selector: BoxedSelector,
    bus: Bus,
    settle: Duration,
    modifier_key: String,
    guard: InFlightGuard,
}

impl Orchestrator {
    pub fn new(fallback: BoxedSwitcher, selector: BoxedSelector) -> Self {
        Self {
            primary: None,
            fallback,
            selector,
            bus: Bus::default(),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            modifier_key: DEFAULT_MODIFIER_KEY.to_string(),
            guard: InFlightGuard::default(),
        }
    }

    /// Enables the primary strategy, tried before the fallback.
    pub fn with_primary(mut self, primary: BoxedSwitcher) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_modifier_key(mut self, modifier_key: impl Into<String>) -> Self {
        self.modifier_key = modifier_key.into();
        self
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    pub async fn run(&self, target: &ContextSelectorTarget) -> SwitchReport {
        let context = target.context_name.as_str();
        let selector = target.selector;
        let Some(_ticket) = self.guard.try_enter() else {
            tracing::warn!(context, selector, "switch already in progress; request dropped");
            self.bus.publish(
                kinds::SWITCH_BUSY,
                &json!({"context": context, "selector": selector}),
            );
            return SwitchReport {
                context: context.to_string(),
                selector,
                outcome: SwitchOutcome::Busy,
                stages: Vec::new(),
            };
        };

        self.bus.publish(
            kinds::SWITCH_STARTED,
            &json!({
                "context": context,
                "selector": selector,
                "primary": self.primary.as_ref().map(|p| p.id()),
                "fallback": self.fallback.id(),
            }),
        );

        let mut stages = Vec::with_capacity(4);
        let mut switched = false;
        if let Some(primary) = self.primary.as_deref() {
            let report = self.switch_stage(Stage::ContextPrimary, primary, context).await;
            switched = report.outcome.is_success();
            stages.push(report);
        }
        if !switched {
            let report = self
                .switch_stage(Stage::ContextFallback, self.fallback.as_ref(), context)
                .await;
            switched = report.outcome.is_success();
            stages.push(report);
        }

        let outcome = if !switched {
            SwitchOutcome::ContextSwitchFailed
        } else {
            if !self.settle.is_zero() {
                let started = Instant::now();
                tokio::time::sleep(self.settle).await;
                stages.push(self.record(Stage::Settle, "delay", Ok(true), started));
            }
            let started = Instant::now();
            let result = self.selector.select(selector, &self.modifier_key).await;
            let report = self.record(Stage::Select, self.selector.id(), result, started);
            let selected = report.outcome.is_success();
            stages.push(report);
            if selected {
                SwitchOutcome::Opened
            } else {
                SwitchOutcome::SelectionFailed
            }
        };

        let report = SwitchReport {
            context: context.to_string(),
            selector,
            outcome,
            stages,
        };
        tracing::info!(
            target: "hop.audit",
            context,
            selector,
            outcome = outcome.as_str(),
            stages = report.stages.len(),
            "workspace switch"
        );
        self.bus.publish(kinds::SWITCH_COMPLETED, &report);
        report
    }

    async fn switch_stage(
        &self,
        stage: Stage,
        switcher: &dyn ContextSwitcher,
        context: &str,
    ) -> StageReport {
        let started = Instant::now();
        let result = switcher.switch_to(context).await;
        self.record(stage, switcher.id(), result, started)
    }

    fn record(
        &self,
        stage: Stage,
        strategy: &str,
        result: Result<bool, CapabilityError>,
        started: Instant,
    ) -> StageReport {
        let report = StageReport {
            stage,
            strategy: strategy.to_string(),
            outcome: StepOutcome::from_result(result),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        match report.outcome.error() {
            Some(error) => tracing::warn!(
                stage = stage.as_str(),
                strategy,
                error,
                "switch stage errored"
            ),
            None => tracing::debug!(
                stage = stage.as_str(),
                strategy,
                status = report.outcome.as_str(),
                "switch stage finished"
            ),
        }
        self.bus.publish(stage.event_kind(), &report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeSwitcher {
        id: &'static str,
        result: Result<bool, CapabilityError>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSwitcher {
        fn new(id: &'static str, result: Result<bool, CapabilityError>) -> Self {
            Self {
                id,
                result,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait::async_trait]
    impl ContextSwitcher for FakeSwitcher {
        fn id(&self) -> &'static str {
            self.id
        }

        async fn switch_to(&self, _context: &str) -> Result<bool, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[derive(Clone)]
    struct FakeSelector {
        result: Result<bool, CapabilityError>,
        calls: Arc<Mutex<Vec<(u32, String)>>>,
    }

    impl FakeSelector {
        fn new(result: Result<bool, CapabilityError>) -> Self {
            Self {
                result,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<(u32, String)> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait::async_trait]
    impl hop_runtime::TabSelector for FakeSelector {
        fn id(&self) -> &'static str {
            "keystroke"
        }

        async fn select(&self, index: u32, modifier_key: &str) -> Result<bool, CapabilityError> {
            self.calls
                .lock()
                .expect("lock")
                .push((index, modifier_key.to_string()));
            self.result.clone()
        }
    }

    fn target() -> ContextSelectorTarget {
        ContextSelectorTarget::new("Work", 2)
    }

    fn stage_names(report: &SwitchReport) -> Vec<Stage> {
        report.stages.iter().map(|s| s.stage).collect()
    }

    #[tokio::test]
    async fn fallback_failure_skips_selection() {
        let fallback = FakeSwitcher::new("script", Ok(false));
        let selector = FakeSelector::new(Ok(true));
        let orchestrator =
            Orchestrator::new(Box::new(fallback.clone()), Box::new(selector.clone()))
                .with_settle(Duration::ZERO);

        let report = orchestrator.run(&target()).await;
        assert_eq!(report.outcome, SwitchOutcome::ContextSwitchFailed);
        assert_eq!(stage_names(&report), vec![Stage::ContextFallback]);
        assert_eq!(report.stages[0].outcome, StepOutcome::SoftFailure);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
        assert!(selector.calls().is_empty());
    }

    #[tokio::test]
    async fn primary_success_then_selection_failure() {
        let primary = FakeSwitcher::new("menu", Ok(true));
        let fallback = FakeSwitcher::new("script", Ok(true));
        let selector = FakeSelector::new(Ok(false));
        let orchestrator =
            Orchestrator::new(Box::new(fallback.clone()), Box::new(selector.clone()))
                .with_primary(Box::new(primary.clone()))
                .with_settle(Duration::ZERO);

        let report = orchestrator.run(&target()).await;
        assert_eq!(report.outcome, SwitchOutcome::SelectionFailed);
        assert_eq!(
            report.outcome.display_label(),
            "Switched workspace, but failed to select tab"
        );
        assert_eq!(
            stage_names(&report),
            vec![Stage::ContextPrimary, Stage::Select]
        );
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
        assert_eq!(selector.calls().len(), 1);
    }

    #[tokio::test]
    async fn primary_soft_failure_falls_back_and_opens() {
        let primary = FakeSwitcher::new("menu", Ok(false));
        let fallback = FakeSwitcher::new("script", Ok(true));
        let selector = FakeSelector::new(Ok(true));
        let orchestrator =
            Orchestrator::new(Box::new(fallback.clone()), Box::new(selector.clone()))
                .with_primary(Box::new(primary))
                .with_modifier_key("control")
                .with_settle(Duration::from_millis(5));

        let report = orchestrator.run(&target()).await;
        assert_eq!(report.outcome, SwitchOutcome::Opened);
        assert!(report.outcome.is_success());
        assert_eq!(
            stage_names(&report),
            vec![
                Stage::ContextPrimary,
                Stage::ContextFallback,
                Stage::Settle,
                Stage::Select
            ]
        );
        assert_eq!(report.stage(Stage::Settle).map(|s| s.strategy.as_str()), Some("delay"));
        assert_eq!(selector.calls(), vec![(2, "control".to_string())]);
    }

    #[tokio::test]
    async fn capability_errors_become_stage_failures() {
        let primary = FakeSwitcher::new("menu", Err(CapabilityError::Failed("not allowed".into())));
        let fallback = FakeSwitcher::new("script", Err(CapabilityError::Timeout(20)));
        let selector = FakeSelector::new(Ok(true));
        let orchestrator = Orchestrator::new(Box::new(fallback), Box::new(selector.clone()))
            .with_primary(Box::new(primary))
            .with_settle(Duration::ZERO);

        let report = orchestrator.run(&target()).await;
        assert_eq!(report.outcome, SwitchOutcome::ContextSwitchFailed);
        assert_eq!(
            report.stages[0].outcome.error(),
            Some("command failed: not allowed")
        );
        assert_eq!(report.stages[1].outcome.error(), Some("timed out after 20s"));
        assert!(selector.calls().is_empty());
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn selection_error_reports_selection_failed() {
        let fallback = FakeSwitcher::new("script", Ok(true));
        let selector = FakeSelector::new(Err(CapabilityError::Io("broken pipe".into())));
        let orchestrator = Orchestrator::new(Box::new(fallback), Box::new(selector))
            .with_settle(Duration::ZERO);

        let report = orchestrator.run(&target()).await;
        assert_eq!(report.outcome, SwitchOutcome::SelectionFailed);
        let select = report.stage(Stage::Select).expect("select stage");
        assert_eq!(select.outcome.as_str(), "hard_failure");
    }
}
