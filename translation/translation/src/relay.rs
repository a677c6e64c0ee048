use crate::capability::{SpeechTranslationService, TranslationRecognizer};
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::event::{EventReceiver, EventSink};
use crate::session::{TurnAction, TurnSession, TurnState};
use crate::stream::PushAudioInputStream;
use crate::types::{RelayResult, TranslationConfig, TurnRequest, TurnStatus};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const STOP_GRACE: Duration = Duration::from_secs(1);

/// Receives everything a turn produces. Calls for one turn are serialized;
/// calls for different turns may interleave.
pub trait TurnObserver: Send + Sync {
    fn on_status(&self, status: TurnStatus);
    fn on_result(&self, result: RelayResult);
    fn on_error(&self, error: RelayError);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub request_id: String,
    pub state: TurnState,
    pub emitted: usize,
    pub fragments: usize,
    pub synthesis_completed: usize,
    pub error: Option<RelayError>,
}

/// Handle to a turn whose driver is running in the background.
#[derive(Debug)]
pub struct TurnHandle {
    request_id: String,
    join: JoinHandle<TurnOutcome>,
}

impl TurnHandle {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Waits for the turn to reach a terminal state. `None` when the driver
    /// was aborted.
    pub async fn wait(self) -> Option<TurnOutcome> {
        match self.join.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("turn {} driver did not finish: {e}", self.request_id);
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn abort(&self) {
        self.join.abort();
    }
}

pub struct TurnRelay {
    service: Arc<dyn SpeechTranslationService>,
    config: RelayConfig,
}

impl TurnRelay {
    pub fn new(
        service: Arc<dyn SpeechTranslationService>,
        config: RelayConfig,
    ) -> Result<Self, RelayError> {
        config.validate()?;
        if config.log_level.is_some() {
            crate::init_logging_from_env(config.log_level.clone());
        }
        config.print_summary();
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Validates the request, opens a recognizer and spawns the turn driver.
    ///
    /// Returns without waiting for any capability result. Input errors are
    /// reported to `observer` and also returned, so callers must not report
    /// them a second time.
    pub fn handle_turn(
        &self,
        request: TurnRequest,
        observer: Arc<dyn TurnObserver>,
    ) -> Result<TurnHandle, RelayError> {
        observer.on_status(TurnStatus::Requesting);

        match self.open_turn(&request) {
            Ok((session, recognizer, events)) => {
                info!(
                    "[{}] turn started: {} -> {} voice={} ({} bytes)",
                    request.request_id,
                    request.from,
                    request.to,
                    request.voice,
                    request.audio.len()
                );
                let driver = TurnDriver {
                    session,
                    recognizer: Some(recognizer),
                    events,
                    observer,
                    timeout: self.config.turn_timeout(),
                    last_error: None,
                };
                let join = tokio::spawn(driver.drive());
                Ok(TurnHandle {
                    request_id: request.request_id,
                    join,
                })
            }
            Err(err) => {
                error!("[{}] turn rejected: {err}", request.request_id);
                observer.on_error(err.clone());
                observer.on_status(TurnStatus::Error(err.status_text()));
                Err(err)
            }
        }
    }

    fn open_turn(
        &self,
        request: &TurnRequest,
    ) -> Result<(TurnSession, Box<dyn TranslationRecognizer>, EventReceiver), RelayError> {
        let key = match request.subscription_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(RelayError::MissingCredential),
        };
        if request.audio.is_empty() {
            return Err(RelayError::EmptyPayload);
        }
        self.config.validate_audio_size(&request.audio)?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(RelayError::invalid_config(
                "handle_turn must be called from within a tokio runtime",
            ));
        }

        // One-shot input: the whole buffer is written, then the stream is closed.
        let (writer, reader) = PushAudioInputStream::create(self.config.max_audio_bytes());
        writer.write(request.audio.clone())?;
        writer.close();

        let translation_config =
            TranslationConfig::from_subscription(key, self.config.service_region.clone())
                .with_recognition_language(request.from.clone())
                .add_target_language(request.to.clone())
                .with_voice(request.voice.clone());
        debug!("[{}] {translation_config:?}", request.request_id);

        let mut session = TurnSession::new(request.request_id.clone(), self.config.emission_policy);
        session.accept();

        let (sink, events) = EventSink::channel();
        let recognizer = self
            .service
            .create_recognizer(translation_config, reader, sink)
            .map_err(RelayError::start_failed)?;

        Ok((session, recognizer, events))
    }
}

struct TurnDriver {
    session: TurnSession,
    recognizer: Option<Box<dyn TranslationRecognizer>>,
    events: EventReceiver,
    observer: Arc<dyn TurnObserver>,
    timeout: Duration,
    last_error: Option<RelayError>,
}

impl TurnDriver {
    async fn drive(mut self) -> TurnOutcome {
        let timeout = self.timeout;
        if tokio::time::timeout(timeout, self.run()).await.is_err() {
            warn!(
                "[{}] turn exceeded {}ms deadline",
                self.session.request_id(),
                timeout.as_millis()
            );
            if let Some(err) = self.session.timed_out(timeout.as_millis() as u64) {
                self.report(err);
            }
            self.stop_recognizer().await;
        }
        self.release();

        info!(
            "[{}] turn finished: {:?} (fragments={}, emitted={})",
            self.session.request_id(),
            self.session.state(),
            self.session.fragment_count(),
            self.session.emitted()
        );
        TurnOutcome {
            request_id: self.session.request_id().to_string(),
            state: self.session.state(),
            emitted: self.session.emitted(),
            fragments: self.session.fragment_count(),
            synthesis_completed: self.session.synthesis_count(),
            error: self.last_error.take(),
        }
    }

    async fn run(&mut self) {
        let started = match self.recognizer.as_mut() {
            Some(recognizer) => recognizer.start_continuous_recognition().await,
            None => return,
        };
        match started {
            Ok(()) => {
                debug!(
                    "[{}] continuous recognition started",
                    self.session.request_id()
                );
                self.session.start_acknowledged();
            }
            Err(e) => {
                error!(
                    "[{}] continuous recognition failed to start: {e}",
                    self.session.request_id()
                );
                if let Some(mut recognizer) = self.recognizer.take() {
                    recognizer.close();
                }
                let err = self.session.start_failed(e);
                self.report(err);
                return;
            }
        }

        while !self.session.state().is_terminal() {
            match self.events.recv().await {
                Some(event) => {
                    for action in self.session.apply(event) {
                        self.dispatch(action);
                    }
                }
                None => {
                    if let Some(err) = self.session.events_closed() {
                        self.report(err);
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, action: TurnAction) {
        match action {
            TurnAction::Emit(result) => {
                debug!(
                    "[{}] relaying fragment {} ({} bytes)",
                    result.request_id,
                    result.fragment_index,
                    result.audio.len()
                );
                self.observer.on_result(result);
                self.observer.on_status(TurnStatus::Cleared);
            }
            TurnAction::Report(err) => self.report(err),
        }
    }

    fn report(&mut self, err: RelayError) {
        error!("[{}] {err}", self.session.request_id());
        let status = TurnStatus::Error(err.status_text());
        self.observer.on_error(err.clone());
        self.observer.on_status(status);
        self.last_error = Some(err);
    }

    async fn stop_recognizer(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            let stop = recognizer.stop_continuous_recognition();
            match tokio::time::timeout(STOP_GRACE, stop).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("[{}] stop failed: {e}", self.session.request_id()),
                Err(_) => debug!("[{}] stop did not complete", self.session.request_id()),
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut recognizer) = self.recognizer.take() {
            recognizer.close();
        }
        self.events.close();
    }
}
