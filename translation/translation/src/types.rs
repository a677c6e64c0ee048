use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One inbound unit of work. Immutable for the duration of its turn.
#[derive(Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub request_id: String,
    pub audio: Bytes,
    pub from: String,
    pub to: String,
    pub voice: String,
    pub subscription_key: Option<String>,
}

impl TurnRequest {
    pub fn new(
        audio: impl Into<Bytes>,
        from: impl Into<String>,
        to: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            audio: audio.into(),
            from: from.into(),
            to: to.into(),
            voice: voice.into(),
            subscription_key: None,
        }
    }

    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.subscription_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

// Keeps the subscription key out of logs.
impl fmt::Debug for TurnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnRequest")
            .field("request_id", &self.request_id)
            .field("audio_bytes", &self.audio.len())
            .field("from", &self.from)
            .field("to", &self.to)
            .field("voice", &self.voice)
            .field("has_credential", &self.has_credential())
            .finish()
    }
}

/// Synthesized audio relayed back to the host for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResult {
    pub request_id: String,
    pub fragment_index: usize,
    pub audio: Bytes,
}

/// Everything the capability needs to open a recognizer for one turn.
#[derive(Clone, PartialEq, Eq)]
pub struct TranslationConfig {
    pub subscription_key: String,
    pub region: String,
    pub speech_recognition_language: String,
    pub target_languages: Vec<String>,
    pub voice_name: String,
}

impl TranslationConfig {
    pub fn from_subscription(key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            subscription_key: key.into(),
            region: region.into(),
            speech_recognition_language: String::new(),
            target_languages: Vec::new(),
            voice_name: String::new(),
        }
    }

    pub fn with_recognition_language(mut self, language: impl Into<String>) -> Self {
        self.speech_recognition_language = language.into();
        self
    }

    pub fn add_target_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !self.target_languages.contains(&language) {
            self.target_languages.push(language);
        }
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice_name = voice.into();
        self
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("region", &self.region)
            .field(
                "speech_recognition_language",
                &self.speech_recognition_language,
            )
            .field("target_languages", &self.target_languages)
            .field("voice_name", &self.voice_name)
            .finish_non_exhaustive()
    }
}

/// Observable progress of a turn, mirrored onto the host's status indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum TurnStatus {
    Requesting,
    Error(String),
    Cleared,
}
