use crate::message::FlowMessage;
use golem_speech_translation::{RelayError, TurnStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFill {
    Blue,
    Red,
    Green,
    Yellow,
    Grey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    Dot,
    Ring,
}

/// Status indicator shown next to the node. All fields empty clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<StatusFill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<StatusShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl NodeStatus {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn is_clear(&self) -> bool {
        self.fill.is_none() && self.shape.is_none() && self.text.is_none()
    }
}

impl From<&TurnStatus> for NodeStatus {
    fn from(status: &TurnStatus) -> Self {
        match status {
            TurnStatus::Requesting => NodeStatus {
                fill: Some(StatusFill::Blue),
                shape: Some(StatusShape::Dot),
                text: Some("Requesting".to_string()),
            },
            TurnStatus::Error(text) => NodeStatus {
                fill: Some(StatusFill::Red),
                shape: Some(StatusShape::Ring),
                text: Some(text.clone()),
            },
            TurnStatus::Cleared => NodeStatus::clear(),
        }
    }
}

/// What the hosting flow engine offers a node.
pub trait NodeContext: Send + Sync {
    /// Forward a message to the node's output.
    fn send(&self, msg: FlowMessage);

    /// Raise an error against the message that caused it.
    fn error(&self, error: &RelayError, msg: &FlowMessage);

    fn status(&self, status: NodeStatus);
}
