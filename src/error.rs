use thiserror::Error;

use crate::types::ToggleAction;

#[derive(Error, Debug)]
pub enum ToggleError {
    #[error("Invalid tag filter: {0}")]
    InvalidTagFilter(String),

    #[error("Failed to list instances matching {filter}: {source:#}")]
    Listing {
        filter: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to {action} instance {instance_id}: {source:#}")]
    Provider {
        action: ToggleAction,
        instance_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid trigger event payload: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("{failed} of {attempted} instance toggles failed")]
    BatchFailed { failed: usize, attempted: usize },
}
