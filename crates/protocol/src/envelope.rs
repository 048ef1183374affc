use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::constants::MessageType;
use crate::messages::{FileEnd, FileStart};

/// Unit of communication in both directions.
///
/// `msg_type` keeps the raw tag so unknown types survive a decode and reach
/// the receive callback unchanged. `content` is omitted from the JSON when
/// null, matching what the server sends for `heartbeat_ack`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
}

impl Envelope {
    /// Creates an envelope with a typed content value.
    pub fn new<T: Serialize>(
        msg_type: impl Into<String>,
        content: Option<&T>,
    ) -> Result<Self, serde_json::Error> {
        let content = match content {
            Some(c) => serde_json::to_value(c)?,
            None => Value::Null,
        };
        Ok(Self {
            msg_type: msg_type.into(),
            content,
        })
    }

    fn with_content(msg_type: MessageType, content: Value) -> Self {
        Self {
            msg_type: msg_type.as_str().to_string(),
            content,
        }
    }

    /// Keepalive sent by the client on every heartbeat tick.
    pub fn heartbeat() -> Self {
        Self::with_content(MessageType::Heartbeat, Value::Null)
    }

    /// Server reply to a heartbeat.
    pub fn heartbeat_ack() -> Self {
        Self::with_content(MessageType::HeartbeatAck, Value::Null)
    }

    pub fn chat(text: impl Into<String>) -> Self {
        Self::with_content(MessageType::Chat, Value::String(text.into()))
    }

    /// Asks the server to stream files; the server understands `"all"`.
    pub fn file_request(scope: impl Into<String>) -> Self {
        Self::with_content(MessageType::FileRequest, Value::String(scope.into()))
    }

    /// Reports the client's network quality (0.0 worst to 1.0 best).
    pub fn network_quality(quality: f64) -> Self {
        let content = serde_json::Number::from_f64(quality)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        Self::with_content(MessageType::NetworkQuality, content)
    }

    /// Announces a transfer; the content is the serialized [`FileStart`].
    pub fn file_start(
        filename: impl Into<String>,
        filesize: u64,
    ) -> Result<Self, serde_json::Error> {
        let start = FileStart {
            filename: filename.into(),
            filesize,
        };
        Self::new(MessageType::FileStart.as_str(), Some(&start))
    }

    /// Encodes raw bytes as one standard-alphabet base64 chunk.
    pub fn file_chunk(data: &[u8]) -> Self {
        Self::with_content(MessageType::FileChunk, Value::String(STANDARD.encode(data)))
    }

    /// Closes a transfer; the content is the serialized [`FileEnd`].
    pub fn file_end(filename: impl Into<String>) -> Result<Self, serde_json::Error> {
        let end = FileEnd {
            filename: filename.into(),
        };
        Self::new(MessageType::FileEnd.as_str(), Some(&end))
    }

    /// Classifies the raw type tag.
    pub fn kind(&self) -> MessageType {
        MessageType::from_tag(&self.msg_type)
    }

    /// Deserializes the content into the given type. Null content yields `None`.
    pub fn parse_content<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        if self.content.is_null() {
            return Ok(None);
        }
        Ok(Some(T::deserialize(&self.content)?))
    }

    /// Returns the content when it is a JSON string.
    pub fn content_str(&self) -> Option<&str> {
        self.content.as_str()
    }

    /// Serializes the envelope into a frame payload (UTF-8 JSON).
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decodes a frame payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
