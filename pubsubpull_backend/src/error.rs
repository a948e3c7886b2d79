use google_cloud_gax::grpc::Status;
use thiserror::Error;

use crate::model::SubscriptionName;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to pull from {subscription}: {source}")]
    PullFailed {
        subscription: SubscriptionName,
        #[source]
        source: Status,
    },

    #[error("Failed to acknowledge {ack_id} on {subscription}: {source}")]
    AcknowledgeFailed {
        subscription: SubscriptionName,
        ack_id: String,
        #[source]
        source: Status,
    },

    #[error("Failed to write message: {0}")]
    Output(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to authenticate: {0}")]
    Auth(#[source] BoxError),

    #[error("Failed to create Pub/Sub client: {0}")]
    Connect(#[source] BoxError),
}

/// A payload that could not be decoded. Never escapes the poll loop.
#[derive(Debug, Error)]
#[error("undecodable payload: {0}")]
pub struct DecodeFailed(#[from] pub base64::DecodeError);
