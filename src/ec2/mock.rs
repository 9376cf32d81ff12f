use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;
use std::collections::HashSet;
use std::sync::Mutex;

use super::{Instance, InstanceProvider};
use crate::types::ToggleAction;

/// In-memory provider recording every call made against it.
#[derive(Default)]
pub struct RecordingProvider {
    instances: Vec<Instance>,
    failing_ids: HashSet<String>,
    fail_listing: bool,
    filters: Mutex<Vec<Vec<Filter>>>,
    calls: Mutex<Vec<(ToggleAction, String)>>,
}

impl RecordingProvider {
    pub fn with_instances(instances: Vec<Instance>) -> Self {
        Self {
            instances,
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, instance_id: &str) -> Self {
        self.failing_ids.insert(instance_id.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn recorded_filters(&self) -> Vec<Vec<Filter>> {
        self.filters.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(ToggleAction, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, action: ToggleAction) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(a, _)| *a == action)
            .map(|(_, id)| id)
            .collect()
    }

    fn record(&self, action: ToggleAction, instance_id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((action, instance_id.to_string()));

        if self.failing_ids.contains(instance_id) {
            return Err(anyhow!(
                "IncorrectInstanceState: cannot {action} instance {instance_id}"
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InstanceProvider for RecordingProvider {
    async fn describe_instances(&self, filters: Vec<Filter>) -> Result<Vec<Instance>> {
        self.filters.lock().unwrap().push(filters);
        if self.fail_listing {
            return Err(anyhow!("UnauthorizedOperation: ec2:DescribeInstances denied"));
        }
        Ok(self.instances.clone())
    }

    async fn start_instance(&self, instance_id: &str) -> Result<()> {
        self.record(ToggleAction::Start, instance_id)
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        self.record(ToggleAction::Stop, instance_id)
    }

    fn region(&self) -> &str {
        "us-east-1"
    }
}
