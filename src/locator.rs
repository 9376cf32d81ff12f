use tracing::{debug, info};

use crate::ec2::{Instance, InstanceProvider, TagFilter};
use crate::error::ToggleError;

/// Returns every instance whose tag `tag_key` equals `tag_value`.
pub async fn locate<P>(
    provider: &P,
    tag_key: &str,
    tag_value: &str,
) -> Result<Vec<Instance>, ToggleError>
where
    P: InstanceProvider + ?Sized,
{
    let filter = TagFilter::new(tag_key, tag_value)?;
    locate_by_filter(provider, &filter).await
}

pub async fn locate_by_filter<P>(
    provider: &P,
    filter: &TagFilter,
) -> Result<Vec<Instance>, ToggleError>
where
    P: InstanceProvider + ?Sized,
{
    debug!(
        tag_key = %filter.key,
        tag_value = %filter.value,
        filter_name = %filter.filter_name(),
        "Adding tag filter to EC2 API request"
    );

    let instances = provider
        .describe_instances(vec![filter.to_filter()])
        .await
        .map_err(|source| ToggleError::Listing {
            filter: filter.to_string(),
            source,
        })?;

    info!(
        region = provider.region(),
        tag_filter = %filter,
        matched_count = instances.len(),
        "Located instances tagged for automation"
    );

    Ok(instances)
}
