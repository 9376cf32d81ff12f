use anyhow::{Context, Result};
use tracing::{error, info};

use ec2_auto_start_stop::config::Config;
use ec2_auto_start_stop::dispatcher::Dispatcher;
use ec2_auto_start_stop::ec2::{Ec2Client, InstanceProvider};
use ec2_auto_start_stop::error::ToggleError;
use ec2_auto_start_stop::logging;
use ec2_auto_start_stop::types::InvocationContext;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args();
    logging::init(&config.log_format, &config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT"),
        build_date = env!("BUILD_DATE"),
        "EC2 auto start/stop starting"
    );

    let options = config
        .dispatch_options()
        .context("Invalid tag filter configuration")?;
    let event = config.trigger_event().context("Invalid trigger event")?;
    let context = InvocationContext::new(config.request_id.clone());

    let ec2_client = Ec2Client::new(config.region.as_deref()).await?;
    config.display(ec2_client.region());

    let dispatcher = Dispatcher::new(ec2_client, options);
    let summary = match dispatcher.run(&event, &context).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(
                error = %e,
                status = "failed",
                "Invocation aborted"
            );
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);

    if !summary.is_success() {
        let err = ToggleError::BatchFailed {
            failed: summary.failed,
            attempted: summary.attempted(),
        };
        error!(
            error = %err,
            status = "failed",
            "Invocation finished with failed instances"
        );
        return Err(err.into());
    }

    Ok(())
}
