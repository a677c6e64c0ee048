//! Seam to the external recognize/translate/synthesize service.
//!
//! A provider crate implements these traits on top of its client library.
//! The relay never inspects the wire protocol; it only consumes the typed
//! events the recognizer pushes into its `EventSink`.

use crate::error::CapabilityError;
use crate::event::EventSink;
use crate::stream::AudioInputStream;
use crate::types::TranslationConfig;
use futures::future::BoxFuture;

pub trait SpeechTranslationService: Send + Sync {
    /// Creates a recognizer bound to one push stream and one event sink.
    /// No network activity is expected before
    /// `start_continuous_recognition` is called.
    fn create_recognizer(
        &self,
        config: TranslationConfig,
        audio: AudioInputStream,
        events: EventSink,
    ) -> Result<Box<dyn TranslationRecognizer>, CapabilityError>;
}

pub trait TranslationRecognizer: Send {
    /// Resolves once the service acknowledged the start. Results arrive
    /// afterwards through the event sink.
    fn start_continuous_recognition(&mut self) -> BoxFuture<'_, Result<(), CapabilityError>>;

    fn stop_continuous_recognition(&mut self) -> BoxFuture<'_, Result<(), CapabilityError>>;

    /// Releases the recognizer. Must be safe to call more than once.
    fn close(&mut self);
}
