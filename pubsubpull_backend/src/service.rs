use std::time::Duration;

use async_trait::async_trait;
use google_cloud_gax::{conn::Environment, grpc::Status};
use google_cloud_pubsub::client::{Client, ClientConfig};

use crate::{
    error::BackendError,
    model::{AcknowledgeRequest, PullRequest, ReceivedMessage, SubscriptionName},
};

/// How long a pull with `return_immediately` may wait before it is treated as empty.
const RETURN_IMMEDIATELY_WAIT: Duration = Duration::from_secs(2);

/// The two subscription RPCs the poll loop needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn pull(
        &self,
        subscription: &SubscriptionName,
        request: &PullRequest,
    ) -> Result<Vec<ReceivedMessage>, Status>;

    async fn acknowledge(
        &self,
        subscription: &SubscriptionName,
        request: &AcknowledgeRequest,
    ) -> Result<(), Status>;
}

pub struct GrpcSubscriptionService {
    client: Client,
}

impl GrpcSubscriptionService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn connect(emulator_project_id: Option<String>) -> Result<Self, BackendError> {
        Ok(Self::new(create_client(emulator_project_id).await?))
    }
}

#[async_trait]
impl SubscriptionService for GrpcSubscriptionService {
    async fn pull(
        &self,
        subscription: &SubscriptionName,
        request: &PullRequest,
    ) -> Result<Vec<ReceivedMessage>, Status> {
        let subscription = self.client.subscription(&subscription.0);
        let max_messages = i32::try_from(request.max_messages).unwrap_or(i32::MAX);
        let pull = subscription.pull(max_messages, None);

        let messages = if request.return_immediately {
            match tokio::time::timeout(RETURN_IMMEDIATELY_WAIT, pull).await {
                Ok(result) => result?,
                Err(_) => Vec::new(),
            }
        } else {
            pull.await?
        };

        Ok(messages.into_iter().map(ReceivedMessage::from).collect())
    }

    async fn acknowledge(
        &self,
        subscription: &SubscriptionName,
        request: &AcknowledgeRequest,
    ) -> Result<(), Status> {
        self.client
            .subscription(&subscription.0)
            .ack(request.ack_ids.clone())
            .await
    }
}

async fn create_client(emulator_project_id: Option<String>) -> Result<Client, BackendError> {
    let mut config = ClientConfig::default()
        .with_auth()
        .await
        .map_err(|err| BackendError::Auth(Box::new(err)))?;

    if let (Environment::Emulator(_), Some(emulator_project_id)) =
        (&config.environment, emulator_project_id)
    {
        config.project_id = Some(emulator_project_id);
    }

    Client::new(config)
        .await
        .map_err(|err| BackendError::Connect(Box::new(err)))
}
