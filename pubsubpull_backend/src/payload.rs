use std::{borrow::Cow, collections::BTreeMap};

use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::{error::DecodeFailed, model::ReceivedMessage};

pub fn decode(data: &str) -> Result<Vec<u8>, DecodeFailed> {
    Ok(BASE64_STANDARD.decode(data)?)
}

/// Decoded payload as text, or a placeholder describing why it could not be decoded.
pub fn render_payload(data: &str) -> String {
    match decode(data) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            log::warn!("{err}");
            format!("<{err}>")
        }
    }
}

/// `<publishTime> <messageId>: <attributes> <payload>`
pub fn format_line(received: &ReceivedMessage) -> String {
    let message = &received.message;

    let publish_time: Cow<'_, str> = match message.publish_time {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::AutoSi, true).into(),
        None => "-".into(),
    };

    let sorted: BTreeMap<&str, &str> = message
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let attributes = Value::Object(Map::from_iter(
        sorted
            .into_iter()
            .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned()))),
    ));

    format!(
        "{} {}: {} {}",
        publish_time,
        message.message_id,
        attributes,
        render_payload(&message.data)
    )
}
