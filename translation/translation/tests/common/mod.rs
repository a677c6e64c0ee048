#![allow(dead_code)]

use bytes::Bytes;
use futures::future::BoxFuture;
use golem_speech_translation::{
    AudioInputStream, CapabilityError, EventSink, RecognizerEvent, RelayError, RelayResult,
    SpeechTranslationService, TranslationConfig, TranslationRecognizer, TurnObserver, TurnStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Capability double that replays a fixed event script once started.
#[derive(Clone, Default)]
pub struct ScriptedService {
    pub script: Vec<RecognizerEvent>,
    pub start_error: Option<CapabilityError>,
    pub create_error: Option<CapabilityError>,
    /// Keep the event sink alive after the script ran, like a stalled service.
    pub hold_open: bool,
    pub calls: Arc<CallLog>,
}

#[derive(Default)]
pub struct CallLog {
    pub created: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub closed: AtomicUsize,
    pub audio: Mutex<Vec<Bytes>>,
    pub configs: Mutex<Vec<TranslationConfig>>,
}

impl ScriptedService {
    pub fn new(script: Vec<RecognizerEvent>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn failing_start(err: CapabilityError) -> Self {
        Self {
            start_error: Some(err),
            ..Default::default()
        }
    }

    pub fn stalled(script: Vec<RecognizerEvent>) -> Self {
        Self {
            script,
            hold_open: true,
            ..Default::default()
        }
    }
}

impl SpeechTranslationService for ScriptedService {
    fn create_recognizer(
        &self,
        config: TranslationConfig,
        audio: AudioInputStream,
        events: EventSink,
    ) -> Result<Box<dyn TranslationRecognizer>, CapabilityError> {
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        self.calls.created.fetch_add(1, Ordering::SeqCst);
        self.calls.configs.lock().unwrap().push(config);
        Ok(Box::new(ScriptedRecognizer {
            service: self.clone(),
            audio,
            events: Some(events),
        }))
    }
}

struct ScriptedRecognizer {
    service: ScriptedService,
    audio: AudioInputStream,
    events: Option<EventSink>,
}

impl TranslationRecognizer for ScriptedRecognizer {
    fn start_continuous_recognition(&mut self) -> BoxFuture<'_, Result<(), CapabilityError>> {
        Box::pin(async move {
            if let Some(err) = &self.service.start_error {
                return Err(err.clone());
            }
            self.service.calls.started.fetch_add(1, Ordering::SeqCst);
            assert!(
                self.audio.is_closed(),
                "audio stream must be closed before start"
            );
            while let Some(chunk) = self.audio.read() {
                self.service.calls.audio.lock().unwrap().push(chunk);
            }
            if let Some(sink) = &self.events {
                for event in self.service.script.iter().cloned() {
                    sink.emit(event);
                }
            }
            if !self.service.hold_open {
                self.events = None;
            }
            Ok(())
        })
    }

    fn stop_continuous_recognition(&mut self) -> BoxFuture<'_, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.service.calls.stopped.fetch_add(1, Ordering::SeqCst);
            self.events = None;
            Ok(())
        })
    }

    fn close(&mut self) {
        self.service.calls.closed.fetch_add(1, Ordering::SeqCst);
        self.events = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Status(TurnStatus),
    Result(RelayResult),
    Error(RelayError),
}

#[derive(Default)]
pub struct RecordingObserver {
    pub seen: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn results(&self) -> Vec<RelayResult> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|o| match o {
                Observed::Result(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<RelayError> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|o| match o {
                Observed::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<TurnStatus> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|o| match o {
                Observed::Status(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

impl TurnObserver for RecordingObserver {
    fn on_status(&self, status: TurnStatus) {
        self.seen.lock().unwrap().push(Observed::Status(status));
    }

    fn on_result(&self, result: RelayResult) {
        self.seen.lock().unwrap().push(Observed::Result(result));
    }

    fn on_error(&self, error: RelayError) {
        self.seen.lock().unwrap().push(Observed::Error(error));
    }
}

pub fn session_started() -> RecognizerEvent {
    RecognizerEvent::SessionStarted {
        session_id: "session-1".to_string(),
    }
}

pub fn session_stopped() -> RecognizerEvent {
    RecognizerEvent::SessionStopped {
        session_id: "session-1".to_string(),
    }
}

/// 100ms of 16-bit mono PCM at 16kHz.
pub fn pcm_buffer() -> Vec<u8> {
    (0..3200u32).map(|i| (i % 251) as u8).collect()
}
