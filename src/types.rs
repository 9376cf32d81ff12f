use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::ec2::{Instance, InstanceState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Start,
    Stop,
}

impl ToggleAction {
    /// Picks the action for an observed state. Transient and terminal states
    /// get `None` and are left alone until a later invocation.
    pub fn for_state(state: &InstanceState) -> Option<Self> {
        match state {
            InstanceState::Stopped => Some(Self::Start),
            InstanceState::Running => Some(Self::Stop),
            InstanceState::Other(_) => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    pub fn status_line(self, instance_id: &str) -> String {
        match self {
            Self::Start => format!("Started instance: {instance_id}"),
            Self::Stop => format!("Stopped instance: {instance_id}"),
        }
    }
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeResult {
    Success,
    DryRun,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    pub action: ToggleAction,
    pub result: OutcomeResult,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleOutcome {
    pub fn success(instance: &Instance, action: ToggleAction, message: String) -> Self {
        Self::new(instance, action, OutcomeResult::Success, message, None)
    }

    pub fn dry_run(instance: &Instance, action: ToggleAction) -> Self {
        let message = format!("DRY RUN: Would {action} instance: {}", instance.id);
        Self::new(instance, action, OutcomeResult::DryRun, message, None)
    }

    pub fn failed(instance: &Instance, action: ToggleAction, error: &impl fmt::Display) -> Self {
        let message = format!("Failed to {action} instance: {}", instance.id);
        Self::new(
            instance,
            action,
            OutcomeResult::Failed,
            message,
            Some(error.to_string()),
        )
    }

    fn new(
        instance: &Instance,
        action: ToggleAction,
        result: OutcomeResult,
        message: String,
        error: Option<String>,
    ) -> Self {
        Self {
            instance_id: instance.id.clone(),
            instance_name: instance.name.clone(),
            action,
            result,
            message,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedInstance {
    pub instance_id: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub status: String,
    pub region: String,
    pub tag_filter: String,
    pub dry_run: bool,
    pub total_matched: usize,
    pub started: usize,
    pub stopped: usize,
    pub skipped: usize,
    pub failed: usize,
    pub execution_time_seconds: f64,
    pub outcomes: Vec<ToggleOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_instances: Vec<SkippedInstance>,
}

impl RunSummary {
    pub fn new(region: &str, tag_filter: String, dry_run: bool, total_matched: usize) -> Self {
        Self {
            status: "Running".to_string(),
            region: region.to_string(),
            tag_filter,
            dry_run,
            total_matched,
            started: 0,
            stopped: 0,
            skipped: 0,
            failed: 0,
            execution_time_seconds: 0.0,
            outcomes: Vec::new(),
            skipped_instances: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: ToggleOutcome) {
        match (outcome.result, outcome.action) {
            (OutcomeResult::Success, ToggleAction::Start) => self.started += 1,
            (OutcomeResult::Success, ToggleAction::Stop) => self.stopped += 1,
            (OutcomeResult::Failed, _) => self.failed += 1,
            (OutcomeResult::DryRun, _) => {}
        }
        self.outcomes.push(outcome);
    }

    pub fn record_skipped(&mut self, instance: &Instance) {
        self.skipped += 1;
        self.skipped_instances.push(SkippedInstance {
            instance_id: instance.id.clone(),
            state: instance.state.to_string(),
        });
    }

    pub fn finish(&mut self, execution_time_seconds: f64) {
        self.execution_time_seconds = execution_time_seconds;
        self.status = if self.is_success() {
            "Success".to_string()
        } else {
            "PartialFailure".to_string()
        };
    }

    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Toggles actually attempted, dry runs included.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
}

/// Opaque per-invocation context handed over by the trigger.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationContext {
    pub request_id: Option<String>,
    pub invoked_at: DateTime<Utc>,
}

impl InvocationContext {
    pub fn new(request_id: Option<String>) -> Self {
        Self {
            request_id,
            invoked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, state: InstanceState) -> Instance {
        Instance::new(id, state)
    }

    mod toggle_action_tests {
        use super::*;

        #[test]
        fn test_stopped_maps_to_start() {
            assert_eq!(
                ToggleAction::for_state(&InstanceState::Stopped),
                Some(ToggleAction::Start)
            );
        }

        #[test]
        fn test_running_maps_to_stop() {
            assert_eq!(
                ToggleAction::for_state(&InstanceState::Running),
                Some(ToggleAction::Stop)
            );
        }

        #[test]
        fn test_other_states_map_to_nothing() {
            for state in ["pending", "stopping", "shutting-down", "terminated"] {
                assert_eq!(
                    ToggleAction::for_state(&InstanceState::from(state)),
                    None,
                    "State '{}' should not trigger any action",
                    state
                );
            }
        }

        #[test]
        fn test_status_lines() {
            assert_eq!(
                ToggleAction::Start.status_line("i-1234567890abcdef0"),
                "Started instance: i-1234567890abcdef0"
            );
            assert_eq!(
                ToggleAction::Stop.status_line("i-1234567890abcdef0"),
                "Stopped instance: i-1234567890abcdef0"
            );
        }
    }

    mod run_summary_tests {
        use super::*;

        #[test]
        fn test_counts_by_result() {
            let stopped = instance("i-stopped", InstanceState::Stopped);
            let running = instance("i-running", InstanceState::Running);
            let broken = instance("i-broken", InstanceState::Running);
            let pending = instance("i-pending", InstanceState::from("pending"));

            let mut summary = RunSummary::new("us-east-1", "auto-start-stop=yes".into(), false, 4);
            summary.record(ToggleOutcome::success(
                &stopped,
                ToggleAction::Start,
                ToggleAction::Start.status_line(&stopped.id),
            ));
            summary.record(ToggleOutcome::success(
                &running,
                ToggleAction::Stop,
                ToggleAction::Stop.status_line(&running.id),
            ));
            summary.record(ToggleOutcome::failed(
                &broken,
                ToggleAction::Stop,
                &"UnauthorizedOperation",
            ));
            summary.record_skipped(&pending);
            summary.finish(0.5);

            assert_eq!(summary.started, 1);
            assert_eq!(summary.stopped, 1);
            assert_eq!(summary.failed, 1);
            assert_eq!(summary.skipped, 1);
            assert_eq!(summary.attempted(), 3);
            assert!(!summary.is_success());
            assert_eq!(summary.status, "PartialFailure");
            assert_eq!(summary.skipped_instances[0].state, "pending");
        }

        #[test]
        fn test_dry_run_outcomes_do_not_count_as_toggles() {
            let stopped = instance("i-stopped", InstanceState::Stopped);
            let mut summary = RunSummary::new("us-east-1", "auto-start-stop=yes".into(), true, 1);
            summary.record(ToggleOutcome::dry_run(&stopped, ToggleAction::Start));
            summary.finish(0.1);

            assert_eq!(summary.started, 0);
            assert_eq!(summary.attempted(), 1);
            assert!(summary.is_success());
            assert_eq!(summary.status, "Success");
            assert_eq!(
                summary.outcomes[0].message,
                "DRY RUN: Would start instance: i-stopped"
            );
        }

        #[test]
        fn test_serializes_failed_outcome_with_error() {
            let broken = instance("i-broken", InstanceState::Stopped).with_name("web-1");
            let outcome = ToggleOutcome::failed(&broken, ToggleAction::Start, &"throttled");
            let json = serde_json::to_value(&outcome).unwrap();

            assert_eq!(json["instance_id"], "i-broken");
            assert_eq!(json["instance_name"], "web-1");
            assert_eq!(json["action"], "start");
            assert_eq!(json["result"], "failed");
            assert_eq!(json["error"], "throttled");
        }

        #[test]
        fn test_serialization_omits_empty_optionals() {
            let stopped = instance("i-stopped", InstanceState::Stopped);
            let mut summary = RunSummary::new("eu-west-1", "env=dev".into(), true, 1);
            summary.record(ToggleOutcome::dry_run(&stopped, ToggleAction::Start));
            summary.finish(0.0);

            let json = serde_json::to_value(&summary).unwrap();
            assert!(json.get("skipped_instances").is_none());
            assert!(json["outcomes"][0].get("error").is_none());
            assert!(json["outcomes"][0].get("instance_name").is_none());
            assert_eq!(json["outcomes"][0]["result"], "dry-run");
        }
    }
}
