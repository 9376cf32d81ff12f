use clap::Parser;
use serde_json::Value;

use crate::dispatcher::{DEFAULT_TAG_KEY, DEFAULT_TAG_VALUE, DispatchOptions};
use crate::ec2::TagFilter;
use crate::error::ToggleError;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ec2-auto-start-stop",
    version,
    about = "Start stopped and stop running EC2 instances selected by tag"
)]
pub struct Config {
    /// Tag key marking instances for automation
    #[arg(long, env = "TAG_KEY", default_value = DEFAULT_TAG_KEY)]
    pub tag_key: String,

    /// Tag value marking instances for automation
    #[arg(long, env = "TAG_VALUE", default_value = DEFAULT_TAG_VALUE)]
    pub tag_value: String,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Dry run mode (no actual start/stop)
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Abort on the first failed start/stop instead of processing the rest
    #[arg(long, env = "FAIL_FAST", default_value = "false")]
    pub fail_fast: bool,

    /// Trigger event payload as JSON
    #[arg(long, env = "TRIGGER_EVENT")]
    pub event: Option<String>,

    /// Request ID of the triggering invocation
    #[arg(long, env = "REQUEST_ID")]
    pub request_id: Option<String>,

    /// Log format: json or pretty
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn dispatch_options(&self) -> Result<DispatchOptions, ToggleError> {
        Ok(DispatchOptions {
            tag_filter: TagFilter::new(&self.tag_key, &self.tag_value)?,
            dry_run: self.dry_run,
            fail_fast: self.fail_fast,
        })
    }

    /// Parses the trigger event. A missing or blank payload becomes `null`.
    pub fn trigger_event(&self) -> Result<Value, ToggleError> {
        match self.event.as_deref().map(str::trim) {
            None | Some("") => Ok(Value::Null),
            Some(raw) => Ok(serde_json::from_str(raw)?),
        }
    }

    pub fn display(&self, actual_region: &str) {
        let region_info = self
            .region
            .clone()
            .unwrap_or_else(|| format!("auto-detect ({actual_region})"));

        tracing::info!(
            tag_key = %self.tag_key,
            tag_value = %self.tag_value,
            dry_run = self.dry_run,
            fail_fast = self.fail_fast,
            region = %region_info,
            log_format = %self.log_format,
            log_level = %self.log_level,
            "Configuration initialized"
        );

        if self.dry_run {
            tracing::warn!("DRY RUN MODE ENABLED - No instances will be started or stopped, only logged");
        }
    }
}
