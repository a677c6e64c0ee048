use crate::config::EmissionPolicy;
use crate::error::RelayError;
use crate::event::{CancellationReason, RecognitionResult, RecognizerEvent, SynthesisReason};
use crate::types::RelayResult;
use bytes::Bytes;
use log::{debug, trace, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingCapability,
    InTurn,
    Completed,
    Cancelled,
    Failed,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnState::Completed | TurnState::Cancelled | TurnState::Failed
        )
    }
}

/// Side effect requested by the session after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAction {
    Emit(RelayResult),
    Report(RelayError),
}

/// State of one recognize/translate/synthesize turn.
///
/// Owned by a single turn driver and mutated only through capability
/// events, so counters and fragments never leak between turns.
#[derive(Debug)]
pub struct TurnSession {
    request_id: String,
    policy: EmissionPolicy,
    state: TurnState,
    in_turn: bool,
    canceled: bool,
    synth_count: usize,
    fragment_count: usize,
    fragments: BTreeMap<usize, Bytes>,
    emitted: usize,
}

impl TurnSession {
    pub fn new(request_id: impl Into<String>, policy: EmissionPolicy) -> Self {
        Self {
            request_id: request_id.into(),
            policy,
            state: TurnState::Idle,
            in_turn: false,
            canceled: false,
            synth_count: 0,
            fragment_count: 0,
            fragments: BTreeMap::new(),
            emitted: 0,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_in_turn(&self) -> bool {
        self.in_turn
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn synthesis_count(&self) -> usize {
        self.synth_count
    }

    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    pub fn fragment(&self, index: usize) -> Option<&Bytes> {
        self.fragments.get(&index)
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// The request passed validation and a recognizer is being opened.
    pub fn accept(&mut self) {
        if self.state == TurnState::Idle {
            self.state = TurnState::AwaitingCapability;
        }
    }

    pub fn start_acknowledged(&mut self) {
        if self.state == TurnState::AwaitingCapability {
            self.state = TurnState::InTurn;
        }
    }

    pub fn start_failed(&mut self, err: impl std::fmt::Display) -> RelayError {
        self.state = TurnState::Failed;
        self.in_turn = false;
        RelayError::start_failed(err)
    }

    pub fn timed_out(&mut self, after_ms: u64) -> Option<RelayError> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = TurnState::Failed;
        self.in_turn = false;
        Some(RelayError::TurnTimedOut(after_ms))
    }

    /// The capability dropped its event sink.
    pub fn events_closed(&mut self) -> Option<RelayError> {
        if self.state.is_terminal() {
            return None;
        }
        self.in_turn = false;
        if self.canceled {
            self.state = TurnState::Cancelled;
            None
        } else if self.fragment_count > 0 {
            self.state = TurnState::Completed;
            None
        } else {
            self.state = TurnState::Failed;
            Some(RelayError::CapabilityClosed)
        }
    }

    pub fn apply(&mut self, event: RecognizerEvent) -> Vec<TurnAction> {
        if self.state.is_terminal() {
            trace!(
                "[{}] ignoring {} event in state {:?}",
                self.request_id,
                event.kind(),
                self.state
            );
            return Vec::new();
        }

        match event {
            RecognizerEvent::SessionStarted { session_id } => {
                debug!("[{}] session started: {session_id}", self.request_id);
                self.in_turn = true;
                if self.state == TurnState::AwaitingCapability {
                    self.state = TurnState::InTurn;
                }
                Vec::new()
            }
            RecognizerEvent::Recognizing(result) => {
                self.log_recognition("Recognizing", &result);
                Vec::new()
            }
            RecognizerEvent::Recognized(result) => {
                self.log_recognition("Recognized", &result);
                Vec::new()
            }
            RecognizerEvent::Synthesizing(reason) => self.on_synthesizing(reason),
            RecognizerEvent::Canceled(details) => match details.reason {
                CancellationReason::Error => {
                    warn!(
                        "[{}] canceled with error: {}",
                        self.request_id,
                        details.error_details.as_deref().unwrap_or("<no details>")
                    );
                    self.state = TurnState::Failed;
                    self.in_turn = false;
                    vec![TurnAction::Report(RelayError::SynthesisCancelled {
                        details: details.error_details,
                    })]
                }
                CancellationReason::EndOfStream => {
                    debug!("[{}] canceled: end of stream", self.request_id);
                    self.canceled = true;
                    Vec::new()
                }
            },
            RecognizerEvent::SessionStopped { session_id } => {
                debug!("[{}] session stopped: {session_id}", self.request_id);
                self.in_turn = false;
                self.state = if self.canceled {
                    TurnState::Cancelled
                } else {
                    TurnState::Completed
                };
                Vec::new()
            }
        }
    }

    fn on_synthesizing(&mut self, reason: SynthesisReason) -> Vec<TurnAction> {
        match reason {
            SynthesisReason::Canceled => {
                debug!("[{}] synthesis canceled", self.request_id);
                self.state = TurnState::Failed;
                self.in_turn = false;
                vec![TurnAction::Report(RelayError::synthesis_cancelled())]
            }
            SynthesisReason::SynthesizingAudio(audio) => {
                let index = self.fragment_count;
                self.fragment_count += 1;
                debug!(
                    "[{}] synthesized fragment {index} ({} bytes)",
                    self.request_id,
                    audio.len()
                );
                self.fragments.insert(index, audio);
                self.emit_for(index)
            }
            SynthesisReason::SynthesizingAudioCompleted => {
                self.synth_count += 1;
                debug!(
                    "[{}] synthesis completed ({} so far)",
                    self.request_id, self.synth_count
                );
                Vec::new()
            }
        }
    }

    fn emit_for(&mut self, index: usize) -> Vec<TurnAction> {
        let emit_index = match self.policy {
            EmissionPolicy::FirstFragment if self.emitted > 0 => return Vec::new(),
            EmissionPolicy::FirstFragment => 0,
            EmissionPolicy::EveryFragment => index,
        };
        match self.fragments.get(&emit_index) {
            Some(audio) => {
                self.emitted += 1;
                vec![TurnAction::Emit(RelayResult {
                    request_id: self.request_id.clone(),
                    fragment_index: emit_index,
                    audio: audio.clone(),
                })]
            }
            None => Vec::new(),
        }
    }

    fn log_recognition(&self, label: &str, result: &RecognitionResult) {
        let translations: Vec<&str> = result.translations.keys().map(String::as_str).collect();
        debug!(
            "[{}] ({label}) reason={:?} text=\"{}\" translations={:?}",
            self.request_id, result.reason, result.text, translations
        );
    }
}
