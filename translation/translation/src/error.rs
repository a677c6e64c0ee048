use thiserror::Error;

/// Errors surfaced to the caller of a turn, either synchronously from
/// `TurnRelay::handle_turn` or asynchronously through a `TurnObserver`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Input subscription key")]
    MissingCredential,
    #[error("Empty Payload")]
    EmptyPayload,
    #[error("Audio too large: {size} bytes exceeds limit of {limit} bytes")]
    AudioTooLarge { size: usize, limit: usize },
    #[error("Synthesis cancelled{}", detail_suffix(.details))]
    SynthesisCancelled { details: Option<String> },
    #[error("Recognition start failed: {0}")]
    RecognitionStartFailed(String),
    #[error("Turn timed out after {0} ms")]
    TurnTimedOut(u64),
    #[error("Capability closed the event stream without finishing the turn")]
    CapabilityClosed,
    #[error("Audio stream error: {0}")]
    Stream(#[from] StreamError),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl RelayError {
    pub fn synthesis_cancelled() -> Self {
        RelayError::SynthesisCancelled { details: None }
    }

    pub fn cancelled_with<S: Into<String>>(details: S) -> Self {
        RelayError::SynthesisCancelled {
            details: Some(details.into()),
        }
    }

    pub fn start_failed(err: impl std::fmt::Display) -> Self {
        RelayError::RecognitionStartFailed(err.to_string())
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        RelayError::InvalidConfiguration(msg.into())
    }

    /// Short text suitable for a node status indicator.
    pub fn status_text(&self) -> String {
        match self {
            RelayError::MissingCredential | RelayError::EmptyPayload => self.to_string(),
            RelayError::AudioTooLarge { .. } => "Audio too large".to_string(),
            RelayError::SynthesisCancelled { .. } => "Synthesis cancelled".to_string(),
            RelayError::RecognitionStartFailed(_) => "Recognition failed".to_string(),
            RelayError::TurnTimedOut(_) => "Timed out".to_string(),
            RelayError::CapabilityClosed => "Service disconnected".to_string(),
            RelayError::Stream(_) => "Audio stream error".to_string(),
            RelayError::InvalidConfiguration(_) => "Invalid configuration".to_string(),
        }
    }

    /// Input errors are detected before any capability call is made.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RelayError::MissingCredential
                | RelayError::EmptyPayload
                | RelayError::AudioTooLarge { .. }
                | RelayError::InvalidConfiguration(_)
        )
    }
}

fn detail_suffix(details: &Option<String>) -> String {
    details
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("stream already closed")]
    Closed,
    #[error("buffer limit exceeded: {attempted} > {limit} bytes")]
    BufferLimitExceeded { attempted: usize, limit: usize },
}

/// Failure reported by a capability implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("recognizer closed")]
    RecognizerClosed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl CapabilityError {
    pub fn network<S: Into<String>>(msg: S) -> Self {
        CapabilityError::Network(msg.into())
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        CapabilityError::Internal(msg.into())
    }
    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        CapabilityError::Unauthorized(msg.into())
    }
}
