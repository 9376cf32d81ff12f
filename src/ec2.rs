mod client;
#[cfg(test)]
pub(crate) mod mock;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;
use std::fmt;

use crate::error::ToggleError;

pub use client::Ec2Client;

const TAG_NAME: &str = "Name";
const STATE_STOPPED: &str = "stopped";
const STATE_RUNNING: &str = "running";
const STATE_UNKNOWN: &str = "unknown";

/// Instance lifecycle state as reported by EC2. Only the two states that can
/// be toggled get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Stopped,
    Running,
    Other(String),
}

impl InstanceState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stopped => STATE_STOPPED,
            Self::Running => STATE_RUNNING,
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for InstanceState {
    fn from(name: &str) -> Self {
        match name {
            STATE_STOPPED => Self::Stopped,
            STATE_RUNNING => Self::Running,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub name: Option<String>,
    pub state: InstanceState,
}

impl Instance {
    pub fn new(id: impl Into<String>, state: InstanceState) -> Self {
        Self {
            id: id.into(),
            name: None,
            state,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }

    /// Converts an SDK instance, dropping entries without an instance ID.
    pub(crate) fn from_sdk(instance: &aws_sdk_ec2::types::Instance) -> Option<Self> {
        let id = instance.instance_id()?;

        let state = instance
            .state()
            .and_then(|s| s.name())
            .map_or_else(
                || InstanceState::Other(STATE_UNKNOWN.to_string()),
                |name| InstanceState::from(name.as_str()),
            );

        let name = instance
            .tags()
            .iter()
            .find(|tag| tag.key() == Some(TAG_NAME))
            .and_then(|tag| tag.value())
            .map(ToString::to_string);

        Some(Self {
            id: id.to_string(),
            name,
            state,
        })
    }
}

/// Tag key/value pair selecting the instances under automation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, ToggleError> {
        let key = key.into();
        let value = value.into();

        if key.trim().is_empty() {
            return Err(ToggleError::InvalidTagFilter(
                "tag key must not be empty".to_string(),
            ));
        }
        if value.trim().is_empty() {
            return Err(ToggleError::InvalidTagFilter(format!(
                "tag value for key '{key}' must not be empty"
            )));
        }

        Ok(Self { key, value })
    }

    pub fn filter_name(&self) -> String {
        format!("tag:{}", self.key)
    }

    pub fn to_filter(&self) -> Filter {
        Filter::builder()
            .name(self.filter_name())
            .values(self.value.clone())
            .build()
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Compute provider operations the toggler relies on.
#[async_trait]
pub trait InstanceProvider: Send + Sync {
    /// Lists every instance matching all `filters`, across all result pages.
    async fn describe_instances(&self, filters: Vec<Filter>) -> Result<Vec<Instance>>;

    async fn start_instance(&self, instance_id: &str) -> Result<()>;

    async fn stop_instance(&self, instance_id: &str) -> Result<()>;

    fn region(&self) -> &str;
}
