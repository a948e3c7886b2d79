use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

/// One delivery from a subscription, in the shape of the Pub/Sub REST API.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message: PubsubMessage,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    /// Base64 encoded payload.
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub message_id: String,
    pub publish_time: Option<DateTime<Utc>>,
}

impl From<google_cloud_pubsub::subscriber::ReceivedMessage> for ReceivedMessage {
    fn from(value: google_cloud_pubsub::subscriber::ReceivedMessage) -> Self {
        let ack_id = value.ack_id().to_string();
        let message = value.message;

        let publish_time = message
            .publish_time
            .map(|t| Utc.timestamp_opt(t.seconds, t.nanos.try_into().unwrap_or(0)))
            .and_then(|lr| match lr {
                chrono::LocalResult::Single(dt) => Some(dt),
                _ => None,
            });

        Self {
            ack_id,
            message: PubsubMessage {
                data: BASE64_STANDARD.encode(&message.data),
                attributes: message.attributes,
                message_id: message.message_id,
                publish_time,
            },
        }
    }
}
