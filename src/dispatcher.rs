use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::ec2::{Instance, InstanceProvider, TagFilter};
use crate::error::ToggleError;
use crate::locator;
use crate::toggler;
use crate::types::{InvocationContext, RunSummary, ToggleAction, ToggleOutcome};

pub const DEFAULT_TAG_KEY: &str = "auto-start-stop";
pub const DEFAULT_TAG_VALUE: &str = "yes";

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub tag_filter: TagFilter,
    pub dry_run: bool,
    /// Abort the batch on the first failed toggle instead of carrying on.
    pub fail_fast: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            tag_filter: TagFilter {
                key: DEFAULT_TAG_KEY.to_string(),
                value: DEFAULT_TAG_VALUE.to_string(),
            },
            dry_run: false,
            fail_fast: false,
        }
    }
}

pub struct Dispatcher<P> {
    provider: P,
    options: DispatchOptions,
}

impl<P: InstanceProvider> Dispatcher<P> {
    pub const fn new(provider: P, options: DispatchOptions) -> Self {
        Self { provider, options }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// One invocation: locate tagged instances and flip each togglable one.
    ///
    /// `event` and `context` come from the trigger and are only logged.
    pub async fn run(
        &self,
        event: &Value,
        context: &InvocationContext,
    ) -> Result<RunSummary, ToggleError> {
        let start_time = Instant::now();

        info!(
            request_id = context.request_id.as_deref().unwrap_or("N/A"),
            invoked_at = %context.invoked_at.to_rfc3339(),
            region = self.provider.region(),
            tag_filter = %self.options.tag_filter,
            dry_run = self.options.dry_run,
            fail_fast = self.options.fail_fast,
            "Invocation started"
        );
        debug!(event = %event, "Trigger event payload");

        let instances = locator::locate_by_filter(&self.provider, &self.options.tag_filter).await?;

        let mut summary = RunSummary::new(
            self.provider.region(),
            self.options.tag_filter.to_string(),
            self.options.dry_run,
            instances.len(),
        );

        for instance in &instances {
            let Some(action) = ToggleAction::for_state(&instance.state) else {
                debug!(
                    instance_id = %instance.id,
                    instance_name = %instance.display_name(),
                    state = %instance.state,
                    "Instance is neither stopped nor running, skipping"
                );
                summary.record_skipped(instance);
                continue;
            };

            match self.apply(instance, action).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    summary.record(ToggleOutcome::failed(instance, action, &e));

                    if self.options.fail_fast {
                        warn!(
                            instance_id = %instance.id,
                            remaining = instances.len() - summary.attempted() - summary.skipped,
                            "Fail-fast enabled, aborting remaining instances"
                        );
                        return Err(e);
                    }
                }
            }
        }

        summary.finish(start_time.elapsed().as_secs_f64());

        info!(
            region = %summary.region,
            total_matched = summary.total_matched,
            started = summary.started,
            stopped = summary.stopped,
            skipped = summary.skipped,
            failed = summary.failed,
            execution_time_seconds = format!("{:.2}", summary.execution_time_seconds),
            "Invocation completed"
        );

        Ok(summary)
    }

    async fn apply(
        &self,
        instance: &Instance,
        action: ToggleAction,
    ) -> Result<ToggleOutcome, ToggleError> {
        if self.options.dry_run {
            let outcome = ToggleOutcome::dry_run(instance, action);
            warn!(
                instance_id = %instance.id,
                instance_name = %instance.display_name(),
                state = %instance.state,
                action = action.as_str(),
                "{}",
                outcome.message
            );
            return Ok(outcome);
        }

        match toggler::toggle(&self.provider, instance, action).await {
            Ok(message) => Ok(ToggleOutcome::success(instance, action, message)),
            Err(e) => {
                error!(
                    instance_id = %instance.id,
                    instance_name = %instance.display_name(),
                    error = %e,
                    action = action.as_str(),
                    result = "failed",
                    "Failed to {} instance",
                    action
                );
                Err(e)
            }
        }
    }
}
