//! Start/stop commands for a single instance.
//!
//! Neither function checks the current state first and neither waits for the
//! transition: a provider call that returns without error counts as success.

use tracing::info;

use crate::ec2::{Instance, InstanceProvider};
use crate::error::ToggleError;
use crate::types::ToggleAction;

/// Issues a start command and returns the `Started instance: <id>` line.
pub async fn start_instance<P>(provider: &P, instance: &Instance) -> Result<String, ToggleError>
where
    P: InstanceProvider + ?Sized,
{
    provider
        .start_instance(&instance.id)
        .await
        .map_err(|source| provider_error(ToggleAction::Start, instance, source))?;

    Ok(report(ToggleAction::Start, instance))
}

/// Issues a stop command and returns the `Stopped instance: <id>` line.
pub async fn stop_instance<P>(provider: &P, instance: &Instance) -> Result<String, ToggleError>
where
    P: InstanceProvider + ?Sized,
{
    provider
        .stop_instance(&instance.id)
        .await
        .map_err(|source| provider_error(ToggleAction::Stop, instance, source))?;

    Ok(report(ToggleAction::Stop, instance))
}

pub async fn toggle<P>(
    provider: &P,
    instance: &Instance,
    action: ToggleAction,
) -> Result<String, ToggleError>
where
    P: InstanceProvider + ?Sized,
{
    match action {
        ToggleAction::Start => start_instance(provider, instance).await,
        ToggleAction::Stop => stop_instance(provider, instance).await,
    }
}

fn provider_error(action: ToggleAction, instance: &Instance, source: anyhow::Error) -> ToggleError {
    ToggleError::Provider {
        action,
        instance_id: instance.id.clone(),
        source,
    }
}

fn report(action: ToggleAction, instance: &Instance) -> String {
    let message = action.status_line(&instance.id);
    info!(
        instance_id = %instance.id,
        instance_name = %instance.display_name(),
        action = action.as_str(),
        result = "success",
        "{}",
        message
    );
    message
}
