pub mod capability;
pub mod config;
pub mod error;
pub mod event;
pub mod relay;
pub mod session;
pub mod stream;
pub mod types;

pub use capability::{SpeechTranslationService, TranslationRecognizer};
pub use config::{EmissionPolicy, RelayConfig};
pub use error::{CapabilityError, RelayError, StreamError};
pub use event::{
    CancellationDetails, CancellationReason, EventSink, RecognitionResult, RecognizerEvent,
    ResultReason, SynthesisReason,
};
pub use relay::{TurnHandle, TurnObserver, TurnOutcome, TurnRelay};
pub use session::{TurnAction, TurnSession, TurnState};
pub use stream::{AudioInputStream, PushAudioInputStream};
pub use types::{RelayResult, TranslationConfig, TurnRequest, TurnStatus};

use log::LevelFilter;

/// Initialize logging once based on provided level string.
pub fn init_logging_from_env(level: Option<String>) {
    let filter = parse_level_filter(level.as_deref().unwrap_or("info"));

    // A host may already have installed a logger; keep theirs.
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp_millis()
        .try_init();
    log::set_max_level(filter);
}

/// Utility to parse a level string to LevelFilter.
pub fn parse_level_filter(s: &str) -> LevelFilter {
    match s.to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}
