//! Typed events emitted by a translation recognizer during one session.

use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    TranslatingSpeech,
    TranslatedSpeech,
    RecognizedSpeech,
    NoMatch,
    Canceled,
}

/// Source-language transcript together with its translations.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub reason: ResultReason,
    pub text: String,
    pub translations: BTreeMap<String, String>,
}

impl RecognitionResult {
    pub fn new(reason: ResultReason, text: impl Into<String>) -> Self {
        Self {
            reason,
            text: text.into(),
            translations: BTreeMap::new(),
        }
    }

    pub fn with_translation(
        mut self,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.translations.insert(language.into(), text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisReason {
    Canceled,
    SynthesizingAudio(Bytes),
    SynthesizingAudioCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    Error,
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationDetails {
    pub reason: CancellationReason,
    pub error_details: Option<String>,
}

impl CancellationDetails {
    pub fn end_of_stream() -> Self {
        Self {
            reason: CancellationReason::EndOfStream,
            error_details: None,
        }
    }

    pub fn error(details: impl Into<String>) -> Self {
        Self {
            reason: CancellationReason::Error,
            error_details: Some(details.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerEvent {
    SessionStarted { session_id: String },
    Recognizing(RecognitionResult),
    Recognized(RecognitionResult),
    Synthesizing(SynthesisReason),
    Canceled(CancellationDetails),
    SessionStopped { session_id: String },
}

impl RecognizerEvent {
    pub fn audio(bytes: impl Into<Bytes>) -> Self {
        RecognizerEvent::Synthesizing(SynthesisReason::SynthesizingAudio(bytes.into()))
    }

    pub fn synthesis_completed() -> Self {
        RecognizerEvent::Synthesizing(SynthesisReason::SynthesizingAudioCompleted)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RecognizerEvent::SessionStarted { .. } => "session_started",
            RecognizerEvent::Recognizing(_) => "recognizing",
            RecognizerEvent::Recognized(_) => "recognized",
            RecognizerEvent::Synthesizing(_) => "synthesizing",
            RecognizerEvent::Canceled(_) => "canceled",
            RecognizerEvent::SessionStopped { .. } => "session_stopped",
        }
    }
}

/// Handed to a capability when its recognizer is created. The capability
/// pushes events here from whatever thread it runs callbacks on; events are
/// then delivered in order to the turn driver.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<RecognizerEvent>,
}

pub type EventReceiver = mpsc::UnboundedReceiver<RecognizerEvent>;

impl EventSink {
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns false once the turn is over and nobody listens anymore.
    pub fn emit(&self, event: RecognizerEvent) -> bool {
        let kind = event.kind();
        if self.tx.send(event).is_err() {
            log::trace!("dropping {kind} event, turn already finished");
            return false;
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
