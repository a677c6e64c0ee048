use crate::error::NodeError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message envelope flowing between nodes.
///
/// Any field the host attaches besides the id, topic and payload is kept in
/// `properties` and travels unchanged with the outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMessage {
    #[serde(rename = "_msgid")]
    pub msg_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub payload: Option<Bytes>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl FlowMessage {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            msg_id: uuid::Uuid::new_v4().to_string(),
            topic: None,
            payload: Some(payload.into()),
            properties: Map::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            payload: None,
            ..Self::new(Bytes::new())
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// The payload as audio; an absent payload reads as an empty buffer.
    pub fn audio(&self) -> Bytes {
        self.payload.clone().unwrap_or_default()
    }

    /// Copy of this message carrying `payload` instead of the inbound one.
    pub fn reply_with(&self, payload: Bytes) -> Self {
        Self {
            payload: Some(payload),
            ..self.clone()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, NodeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, NodeError> {
        Ok(serde_json::to_string(self)?)
    }
}
