mod common;

use bytes::Bytes;
use common::{pcm_buffer, session_started, session_stopped, RecordingObserver, ScriptedService};
use golem_speech_translation::{
    CancellationDetails, CapabilityError, EmissionPolicy, RecognitionResult, RecognizerEvent,
    RelayConfig, RelayError, ResultReason, SynthesisReason, TurnRelay, TurnRequest, TurnState,
    TurnStatus,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn relay(service: &ScriptedService, config: RelayConfig) -> TurnRelay {
    TurnRelay::new(Arc::new(service.clone()), config).unwrap()
}

fn request(audio: Vec<u8>) -> TurnRequest {
    TurnRequest::new(audio, "en-US", "de-DE", "de-DE-Hedda").with_subscription_key("test-key")
}

fn full_turn_script() -> Vec<RecognizerEvent> {
    vec![
        session_started(),
        RecognizerEvent::Recognizing(RecognitionResult::new(
            ResultReason::TranslatingSpeech,
            "hello",
        )),
        RecognizerEvent::Recognized(
            RecognitionResult::new(ResultReason::TranslatedSpeech, "hello world")
                .with_translation("de", "hallo Welt"),
        ),
        RecognizerEvent::audio(&b"first-fragment"[..]),
        RecognizerEvent::audio(&b"second-fragment"[..]),
        RecognizerEvent::synthesis_completed(),
        RecognizerEvent::Canceled(CancellationDetails::end_of_stream()),
        session_stopped(),
    ]
}

#[tokio::test]
async fn pcm_turn_emits_first_fragment_once() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let handle = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap();
    let outcome = handle.wait().await.unwrap();

    let results = observer.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].audio, Bytes::from_static(b"first-fragment"));
    assert_eq!(results[0].fragment_index, 0);
    assert_eq!(
        observer.statuses(),
        vec![TurnStatus::Requesting, TurnStatus::Cleared]
    );
    assert!(observer.errors().is_empty());

    assert_eq!(outcome.state, TurnState::Cancelled);
    assert_eq!(outcome.fragments, 2);
    assert_eq!(outcome.synthesis_completed, 1);
    assert_eq!(outcome.error, None);

    let audio = service.calls.audio.lock().unwrap().clone();
    assert_eq!(audio.len(), 1, "audio is written as a single chunk");
    assert_eq!(audio[0].len(), 3200);

    let configs = service.calls.configs.lock().unwrap().clone();
    assert_eq!(configs[0].speech_recognition_language, "en-US");
    assert_eq!(configs[0].target_languages, vec!["de-DE".to_string()]);
    assert_eq!(configs[0].voice_name, "de-DE-Hedda");
    assert_eq!(configs[0].region, "westus");
    assert_eq!(service.calls.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_fragment_policy_relays_all_fragments() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(
        &service,
        RelayConfig::default().with_emission_policy(EmissionPolicy::EveryFragment),
    );
    let observer = Arc::new(RecordingObserver::default());

    let outcome = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap()
        .wait()
        .await
        .unwrap();

    let audio: Vec<Bytes> = observer.results().into_iter().map(|r| r.audio).collect();
    assert_eq!(
        audio,
        vec![
            Bytes::from_static(b"first-fragment"),
            Bytes::from_static(b"second-fragment"),
        ]
    );
    assert_eq!(outcome.emitted, 2);
}

#[tokio::test]
async fn empty_payload_fails_fast() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let err = relay
        .handle_turn(request(Vec::new()), observer.clone())
        .unwrap_err();

    assert_eq!(err, RelayError::EmptyPayload);
    assert_eq!(observer.errors(), vec![RelayError::EmptyPayload]);
    assert_eq!(
        observer.statuses(),
        vec![
            TurnStatus::Requesting,
            TurnStatus::Error("Empty Payload".to_string()),
        ]
    );
    assert!(observer.results().is_empty());
    assert_eq!(service.calls.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_credential_fails_fast() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(&service, RelayConfig::default());

    for key in [None, Some(""), Some("   ")] {
        let observer = Arc::new(RecordingObserver::default());
        let mut req = TurnRequest::new(pcm_buffer(), "en-US", "de-DE", "de-DE-Hedda");
        if let Some(key) = key {
            req = req.with_subscription_key(key);
        }

        let err = relay.handle_turn(req, observer.clone()).unwrap_err();
        assert_eq!(err, RelayError::MissingCredential);
        assert_eq!(
            observer.statuses().last(),
            Some(&TurnStatus::Error("Input subscription key".to_string()))
        );
        assert!(observer.results().is_empty());
    }
    assert_eq!(service.calls.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_audio_is_rejected() {
    let service = ScriptedService::new(full_turn_script());
    let mut config = RelayConfig::default();
    config.max_audio_size_mb = 1;
    let relay = relay(&service, config);
    let observer = Arc::new(RecordingObserver::default());

    let err = relay
        .handle_turn(request(vec![0u8; 1024 * 1024 + 1]), observer)
        .unwrap_err();
    assert!(matches!(err, RelayError::AudioTooLarge { .. }));
    assert_eq!(service.calls.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_error_is_reported_with_details() {
    let service = ScriptedService::new(vec![
        session_started(),
        RecognizerEvent::Canceled(CancellationDetails::error("1006: connection reset")),
        RecognizerEvent::audio(&b"ignored"[..]),
        session_stopped(),
    ]);
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let outcome = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap()
        .wait()
        .await
        .unwrap();

    let expected = RelayError::cancelled_with("1006: connection reset");
    assert_eq!(observer.errors(), vec![expected.clone()]);
    assert!(observer.results().is_empty());
    assert_eq!(outcome.state, TurnState::Failed);
    assert_eq!(outcome.error, Some(expected));
    assert_eq!(outcome.fragments, 0);
}

#[tokio::test]
async fn synthesis_cancel_ends_turn_without_output() {
    let service = ScriptedService::new(vec![
        session_started(),
        RecognizerEvent::Synthesizing(SynthesisReason::Canceled),
        session_stopped(),
    ]);
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let outcome = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(observer.errors(), vec![RelayError::synthesis_cancelled()]);
    assert_eq!(
        observer.statuses().last(),
        Some(&TurnStatus::Error("Synthesis cancelled".to_string()))
    );
    assert_eq!(outcome.state, TurnState::Failed);
}

#[tokio::test]
async fn start_failure_releases_recognizer() {
    let service =
        ScriptedService::failing_start(CapabilityError::unauthorized("invalid subscription"));
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let outcome = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(outcome.state, TurnState::Failed);
    assert!(matches!(
        outcome.error,
        Some(RelayError::RecognitionStartFailed(_))
    ));
    assert_eq!(service.calls.closed.load(Ordering::SeqCst), 1);
    assert_eq!(observer.errors().len(), 1);
}

#[tokio::test]
async fn recognizer_creation_failure_is_synchronous() {
    let service = ScriptedService {
        create_error: Some(CapabilityError::network("dns failure")),
        ..Default::default()
    };
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let err = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap_err();
    assert!(matches!(err, RelayError::RecognitionStartFailed(_)));
    assert_eq!(observer.errors(), vec![err]);
}

#[tokio::test(start_paused = true)]
async fn stalled_turn_times_out_and_releases_resources() {
    let service = ScriptedService::stalled(vec![session_started()]);
    let relay = relay(
        &service,
        RelayConfig::default().with_turn_timeout(Duration::from_secs(5)),
    );
    let observer = Arc::new(RecordingObserver::default());

    let outcome = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(outcome.state, TurnState::Failed);
    assert_eq!(outcome.error, Some(RelayError::TurnTimedOut(5000)));
    assert_eq!(observer.errors(), vec![RelayError::TurnTimedOut(5000)]);
    assert_eq!(service.calls.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(service.calls.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn aborted_turn_yields_no_outcome() {
    let service = ScriptedService::stalled(vec![session_started()]);
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let handle = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap();
    tokio::task::yield_now().await;
    assert_eq!(service.calls.started.load(Ordering::SeqCst), 1);
    assert!(!handle.is_finished());

    handle.abort();
    assert!(handle.wait().await.is_none());
    assert!(observer.results().is_empty());
}

#[tokio::test]
async fn handle_reports_finished_turn() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let handle = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap();
    assert!(!handle.request_id().is_empty());
    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(settled.is_ok());
    assert_eq!(observer.results().len(), 1);

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.state, TurnState::Cancelled);
}

#[tokio::test]
async fn capability_closing_silently_is_an_error() {
    let service = ScriptedService::new(vec![session_started()]);
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let outcome = relay
        .handle_turn(request(pcm_buffer()), observer.clone())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(outcome.error, Some(RelayError::CapabilityClosed));
    assert_eq!(observer.errors(), vec![RelayError::CapabilityClosed]);
}

#[tokio::test]
async fn concurrent_turns_are_isolated() {
    let first = ScriptedService::new(vec![
        session_started(),
        RecognizerEvent::audio(&b"turn-a"[..]),
        session_stopped(),
    ]);
    let second = ScriptedService::new(vec![
        session_started(),
        RecognizerEvent::audio(&b"turn-b"[..]),
        RecognizerEvent::audio(&b"turn-b-2"[..]),
        session_stopped(),
    ]);
    let relay_a = relay(&first, RelayConfig::default());
    let relay_b = relay(&second, RelayConfig::default());
    let observer_a = Arc::new(RecordingObserver::default());
    let observer_b = Arc::new(RecordingObserver::default());

    let request_a = request(pcm_buffer()).with_request_id("a");
    let handle_a = relay_a
        .handle_turn(request_a, observer_a.clone())
        .unwrap();
    let request_b = request(pcm_buffer()).with_request_id("b");
    let handle_b = relay_b
        .handle_turn(request_b, observer_b.clone())
        .unwrap();
    assert_eq!(handle_a.request_id(), "a");

    let (outcome_a, outcome_b) = tokio::join!(handle_a.wait(), handle_b.wait());
    let (outcome_a, outcome_b) = (outcome_a.unwrap(), outcome_b.unwrap());

    assert_eq!(outcome_a.fragments, 1);
    assert_eq!(outcome_b.fragments, 2);
    assert_eq!(observer_a.results()[0].audio, Bytes::from_static(b"turn-a"));
    assert_eq!(observer_a.results()[0].request_id, "a");
    assert_eq!(observer_b.results()[0].audio, Bytes::from_static(b"turn-b"));
    assert_eq!(observer_b.results()[0].request_id, "b");
}

#[tokio::test]
async fn same_relay_runs_turns_back_to_back() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(&service, RelayConfig::default());

    for _ in 0..3 {
        let observer = Arc::new(RecordingObserver::default());
        let outcome = relay
            .handle_turn(request(pcm_buffer()), observer.clone())
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(outcome.fragments, 2);
        assert_eq!(observer.results().len(), 1);
    }
    assert_eq!(service.calls.created.load(Ordering::SeqCst), 3);
}

#[test]
fn handle_turn_outside_runtime_is_rejected() {
    let service = ScriptedService::new(full_turn_script());
    let relay = relay(&service, RelayConfig::default());
    let observer = Arc::new(RecordingObserver::default());

    let err = relay
        .handle_turn(request(pcm_buffer()), observer)
        .unwrap_err();
    assert!(matches!(err, RelayError::InvalidConfiguration(_)));
    assert_eq!(service.calls.created.load(Ordering::SeqCst), 0);
}
