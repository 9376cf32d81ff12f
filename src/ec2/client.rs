use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::operation::describe_instances::DescribeInstancesOutput;
use aws_sdk_ec2::types::Filter;
use tracing::{debug, info};

use super::{Instance, InstanceProvider};

pub struct Ec2Client {
    client: Client,
    region: String,
}

impl Ec2Client {
    /// Creates a new EC2 client with AWS SDK configuration
    ///
    /// Region resolution priority:
    /// 1. Explicit region from Config (--region CLI arg or AWS_REGION env var)
    /// 2. AWS SDK defaults (environment variables, ~/.aws/config, IMDS)
    pub async fn new(region: Option<&str>) -> Result<Self> {
        let config = Self::load_aws_config(region).await;
        let region_name = config
            .region()
            .map_or("unknown", |r| r.as_ref())
            .to_string();

        info!(
            region = %region_name,
            "AWS EC2 client initialized successfully"
        );

        Ok(Self {
            client: Client::new(&config),
            region: region_name,
        })
    }

    async fn load_aws_config(region: Option<&str>) -> aws_config::SdkConfig {
        match region {
            Some(r) => {
                info!(region = %r, "Using explicit AWS region from configuration");
                aws_config::defaults(BehaviorVersion::latest())
                    .region(aws_config::Region::new(r.to_string()))
                    .load()
                    .await
            }
            None => {
                debug!("Using default AWS region from AWS SDK (environment/credentials file/IMDS)");
                aws_config::load_defaults(BehaviorVersion::latest()).await
            }
        }
    }

    fn collect_instances(page: &DescribeInstancesOutput) -> Vec<Instance> {
        page.reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .filter_map(Instance::from_sdk)
            .collect()
    }
}

#[async_trait]
impl InstanceProvider for Ec2Client {
    async fn describe_instances(&self, filters: Vec<Filter>) -> Result<Vec<Instance>> {
        debug!(
            applied_filters = filters.len(),
            "Sending DescribeInstances API request"
        );

        let mut pages = self
            .client
            .describe_instances()
            .set_filters(Some(filters))
            .into_paginator()
            .send();

        let mut instances = Vec::new();
        let mut page_count = 0u32;
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe instances")?;
            page_count += 1;
            instances.extend(Self::collect_instances(&page));
        }

        debug!(
            page_count = page_count,
            instance_count = instances.len(),
            "Received all DescribeInstances pages"
        );

        Ok(instances)
    }

    async fn start_instance(&self, instance_id: &str) -> Result<()> {
        info!(
            instance_id = %instance_id,
            region = %self.region,
            api_action = "StartInstances",
            "Sending start request to AWS EC2 API"
        );

        self.client
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .with_context(|| format!("Failed to start instance {instance_id}"))?;

        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        info!(
            instance_id = %instance_id,
            region = %self.region,
            api_action = "StopInstances",
            "Sending stop request to AWS EC2 API"
        );

        self.client
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .with_context(|| format!("Failed to stop instance {instance_id}"))?;

        Ok(())
    }

    fn region(&self) -> &str {
        &self.region
    }
}
