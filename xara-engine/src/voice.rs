// Push-to-talk bridge between a `SpeechRecognizer` and the controller.
//
// Idle -> Recording on `Started` (arms the hard timeout). A final transcript fills the
// input and is sent after a grace delay once recording is over; an end without a
// processed final result sends whatever the interim results left in the input.

use tokio::sync::mpsc;

use xara_core::error::WidgetError;

use crate::controller::{Inner, WidgetController};
use crate::session::InputHint;
use crate::timer::TimerToken;
use crate::traits::{SpeechErrorKind, SpeechEvent};

impl WidgetController {
    pub fn voice_available(&self) -> bool {
        self.speech.is_some()
    }

    /// Pointer-down / touch-start on the mic control.
    pub async fn start_recording(&self) -> Result<(), WidgetError> {
        let Some(rec) = self.speech.clone() else {
            return Err(WidgetError::SpeechUnavailable);
        };

        let mut inner = self.inner.lock().await;
        if inner.voice.active || inner.disposed {
            return Ok(());
        }
        inner.voice.active = true;
        inner.voice.processed = false;

        // Each utterance gets its own channel so late events from an earlier one are lost
        // together with its pump.
        let (tx, mut rx) = mpsc::unbounded_channel();
        inner.timers.abort_pump();
        let ctrl = self.clone();
        inner.timers.speech_pump = Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                ctrl.on_speech_event(event).await;
            }
        }));

        if let Err(e) = rec.start(tx) {
            log::error!("speech recognition failed to start: {e:#}");
            inner.voice.active = false;
            inner.timers.abort_pump();
            self.show_speech_hint(&mut inner, &SpeechErrorKind::Other(e.to_string()));
        }
        Ok(())
    }

    /// Pointer-up / pointer-leave / touch-end on the mic control.
    pub async fn stop_recording(&self) {
        let active = self.inner.lock().await.voice.active;
        if !active {
            return;
        }
        if let Some(rec) = &self.speech {
            rec.stop();
        }
    }

    /// Applies one recognizer event. Normally fed by the pump spawned in `start_recording`.
    pub async fn on_speech_event(&self, event: SpeechEvent) {
        let mut inner = self.inner.lock().await;
        let timings = self.cfg.timings;

        match event {
            SpeechEvent::Started => {
                inner.voice.recording = true;
                inner.voice.processed = false;

                let ctrl = self.clone();
                inner
                    .timers
                    .speech_timeout
                    .arm(timings.speech_hard_timeout(), move |token| async move {
                        ctrl.on_speech_timeout(token).await;
                    });

                self.rearm_watchdog(&mut inner);
            }
            SpeechEvent::Interim(text) => {
                if !text.is_empty() {
                    inner.input = text;
                    self.rearm_watchdog(&mut inner);
                }
            }
            SpeechEvent::Final(text) => {
                let text = text.trim().to_string();
                if text.is_empty() || inner.voice.processed {
                    return;
                }
                inner.voice.processed = true;
                inner.input = text.clone();

                let ctrl = self.clone();
                inner
                    .timers
                    .speech_submit
                    .arm(timings.final_result_grace(), move |token| async move {
                        ctrl.on_final_grace(token, text).await;
                    });
            }
            SpeechEvent::Error(kind) => {
                log::error!("speech recognition error: {kind:?}");
                inner.timers.speech_timeout.cancel();
                inner.voice.active = false;
                inner.voice.recording = false;
                inner.voice.processed = false;
                self.show_speech_hint(&mut inner, &kind);
            }
            SpeechEvent::Ended => {
                inner.timers.speech_timeout.cancel();
                inner.voice.active = false;
                inner.voice.recording = false;

                if inner.input.trim().is_empty() || inner.voice.processed {
                    return;
                }
                inner.voice.processed = true;

                let ctrl = self.clone();
                inner
                    .timers
                    .speech_submit
                    .arm(timings.end_of_speech_grace(), move |token| async move {
                        ctrl.on_end_grace(token).await;
                    });
            }
        }
    }

    // Error hint in place of the input placeholder, reverted after the hint TTL.
    fn show_speech_hint(&self, inner: &mut Inner, kind: &SpeechErrorKind) {
        inner.input_hint = Some(InputHint {
            text: kind.hint().to_string(),
            is_error: true,
        });
        let ctrl = self.clone();
        inner
            .timers
            .hint_revert
            .arm(self.cfg.timings.speech_hint_ttl(), move |token| async move {
                ctrl.on_hint_revert(token).await;
            });
    }

    async fn on_speech_timeout(&self, token: TimerToken) {
        {
            let mut inner = self.inner.lock().await;
            if !inner.timers.speech_timeout.claim(token) {
                return;
            }
        }
        log::info!("speech hard timeout reached; stopping recognizer");
        if let Some(rec) = &self.speech {
            rec.stop();
        }
    }

    async fn on_final_grace(&self, token: TimerToken, text: String) {
        {
            let mut inner = self.inner.lock().await;
            if !inner.timers.speech_submit.claim(token) {
                return;
            }
            // Still holding the mic: leave the text in the input for the visitor.
            if inner.voice.recording {
                return;
            }
        }
        if let Err(e) = self.submit_text(&text).await {
            log::warn!("voice submission skipped: {e}");
        }
    }

    async fn on_end_grace(&self, token: TimerToken) {
        let text = {
            let mut inner = self.inner.lock().await;
            if !inner.timers.speech_submit.claim(token) {
                return;
            }
            inner.input.clone()
        };
        if let Err(e) = self.submit_text(&text).await {
            log::warn!("voice submission skipped: {e}");
        }
    }

    async fn on_hint_revert(&self, token: TimerToken) {
        let mut inner = self.inner.lock().await;
        if inner.timers.hint_revert.claim(token) {
            inner.input_hint = None;
        }
    }
}
