use golem_speech_translation::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid node configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Unknown shared credential '{0}'")]
    UnknownCredential(String),
    #[error("Malformed message: {0}")]
    Message(#[from] serde_json::Error),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl NodeError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        NodeError::InvalidConfiguration(msg.into())
    }
}
