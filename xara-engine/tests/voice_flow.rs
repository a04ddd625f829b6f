use std::sync::Arc;
use std::time::Duration;

use xara_core::config::WidgetConfig;
use xara_core::error::WidgetError;
use xara_engine::controller::WidgetController;
use xara_engine::testing::{RecordingAgent, ScriptedRecognizer};
use xara_engine::traits::{SpeechErrorKind, SpeechEvent};

fn voice_widget() -> (WidgetController, Arc<RecordingAgent>, Arc<ScriptedRecognizer>) {
    let agent = Arc::new(RecordingAgent::new());
    let rec = Arc::new(ScriptedRecognizer::new());
    let ctrl =
        WidgetController::new(WidgetConfig::default(), agent.clone()).with_speech(rec.clone());
    (ctrl, agent, rec)
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// Lets the event pump drain without moving the clock far.
async fn settle() {
    advance(1).await;
}

#[tokio::test(start_paused = true)]
async fn final_transcript_is_sent_after_release() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;
    rec.push_utterance("do you offer gift cards");

    ctrl.start_recording().await.unwrap();
    settle().await;
    let snap = ctrl.snapshot().await;
    assert!(snap.recording);
    assert_eq!(snap.input, "do you offer gift cards");

    ctrl.stop_recording().await;
    settle().await;
    assert!(!ctrl.snapshot().await.recording);
    assert!(agent.chat_texts().is_empty());

    advance(1_500).await;
    assert_eq!(agent.chat_texts(), vec!["do you offer gift cards"]);
    assert_eq!(ctrl.snapshot().await.transcript.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn holding_the_mic_keeps_the_text_in_the_input() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;
    rec.push_utterance("what time do you close");

    ctrl.start_recording().await.unwrap();
    advance(2_000).await;
    assert!(agent.chat_texts().is_empty());

    ctrl.stop_recording().await;
    advance(2_000).await;
    assert!(agent.chat_texts().is_empty());
    assert_eq!(ctrl.snapshot().await.input, "what time do you close");
}

#[tokio::test(start_paused = true)]
async fn interim_text_is_sent_shortly_after_the_end() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;

    ctrl.start_recording().await.unwrap();
    settle().await;
    assert!(rec.emit(SpeechEvent::Interim("are you open sunday".into())));
    settle().await;
    assert_eq!(ctrl.snapshot().await.input, "are you open sunday");

    ctrl.stop_recording().await;
    advance(400).await;
    assert!(agent.chat_texts().is_empty());

    advance(200).await;
    assert_eq!(agent.chat_texts(), vec!["are you open sunday"]);
}

#[tokio::test(start_paused = true)]
async fn silent_release_sends_nothing() {
    let (ctrl, agent, _rec) = voice_widget();
    ctrl.open().await;

    ctrl.start_recording().await.unwrap();
    settle().await;
    ctrl.stop_recording().await;

    advance(5_000).await;
    assert!(agent.calls().is_empty());
    assert!(!ctrl.snapshot().await.recording);
}

#[tokio::test(start_paused = true)]
async fn hard_timeout_stops_the_recognizer() {
    let (ctrl, _agent, rec) = voice_widget();
    ctrl.open().await;

    ctrl.start_recording().await.unwrap();
    advance(9_900).await;
    assert_eq!(rec.stops(), 0);
    assert!(ctrl.snapshot().await.recording);

    advance(200).await;
    assert_eq!(rec.stops(), 1);
    assert!(!ctrl.snapshot().await.recording);
}

#[tokio::test(start_paused = true)]
async fn recognition_error_shows_a_temporary_hint() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;
    rec.push_error(SpeechErrorKind::NotAllowed);

    ctrl.start_recording().await.unwrap();
    settle().await;

    let snap = ctrl.snapshot().await;
    let hint = snap.input_hint.unwrap();
    assert!(hint.is_error);
    assert_eq!(hint.text, SpeechErrorKind::NotAllowed.hint());
    assert!(!snap.recording);

    advance(2_900).await;
    assert!(ctrl.snapshot().await.input_hint.is_some());
    advance(200).await;
    assert!(ctrl.snapshot().await.input_hint.is_none());
    assert!(agent.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn recording_is_unavailable_without_a_recognizer() {
    let agent = Arc::new(RecordingAgent::new());
    let ctrl = WidgetController::new(WidgetConfig::default(), agent);

    assert!(!ctrl.voice_available());
    assert!(!ctrl.snapshot().await.voice_available);
    assert_eq!(
        ctrl.start_recording().await,
        Err(WidgetError::SpeechUnavailable)
    );
}

#[tokio::test(start_paused = true)]
async fn starting_to_speak_counts_as_activity() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;
    ctrl.submit_text("hello").await.unwrap();

    advance(170_000).await;
    ctrl.start_recording().await.unwrap();
    advance(20_000).await;

    assert!(ctrl.snapshot().await.is_open);
    assert!(agent.close_calls().is_empty());
    // The hard timeout ended the silent utterance on its own.
    assert_eq!(rec.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn refresh_abandons_an_active_recording() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;
    rec.push_utterance("cancel my booking");

    ctrl.start_recording().await.unwrap();
    settle().await;
    ctrl.refresh_session().await;
    assert_eq!(rec.stops(), 1);

    advance(5_000).await;
    let snap = ctrl.snapshot().await;
    assert!(!snap.recording);
    assert_eq!(snap.input, "");
    assert!(agent.chat_texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn recognizer_that_fails_to_start_shows_a_hint() {
    let (ctrl, agent, rec) = voice_widget();
    ctrl.open().await;
    rec.fail_start(true);

    ctrl.start_recording().await.unwrap();
    let snap = ctrl.snapshot().await;
    let hint = snap.input_hint.unwrap();
    assert!(hint.is_error);
    assert_eq!(hint.text, SpeechErrorKind::Other(String::new()).hint());
    assert!(!snap.recording);

    advance(3_100).await;
    assert!(ctrl.snapshot().await.input_hint.is_none());

    // The next press tries again.
    rec.fail_start(false);
    ctrl.start_recording().await.unwrap();
    assert_eq!(rec.starts(), 2);
    assert!(agent.calls().is_empty());
}
