mod received_message;
pub use received_message::{PubsubMessage, ReceivedMessage};

use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionName(pub String);

impl fmt::Display for SubscriptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters sent with every pull. Built once per run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PullRequest {
    pub max_messages: u32,
    pub return_immediately: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AcknowledgeRequest {
    pub ack_ids: Vec<String>,
}

impl AcknowledgeRequest {
    pub fn single(ack_id: impl Into<String>) -> Self {
        Self {
            ack_ids: vec![ack_id.into()],
        }
    }
}
