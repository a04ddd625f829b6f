use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use xara_core::config::WidgetConfig;
use xara_core::error::WidgetError;
use xara_core::feedback::{QueryResolved, Satisfaction};
use xara_core::intent::accepts_thumbs;
use xara_core::phone::build_identity_message;
use xara_core::types::{Message, SessionId, Thumb};

use crate::session::{CloseReason, InputHint, Session, SurveyPhase, SurveyState, WidgetSnapshot};
use crate::timer::{TimerSlot, TimerToken};
use crate::traits::{AgentClient, SpeechRecognizer};

pub const FALLBACK_REPLY: &str = "Sorry, there was an error. Please try again.";

#[derive(Debug, Default)]
pub(crate) struct VoiceState {
    // The recognizer was asked to start and has not reported the end yet.
    pub(crate) active: bool,
    pub(crate) recording: bool,
    pub(crate) processed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Timers {
    pub(crate) watchdog: TimerSlot,
    pub(crate) survey_open: TimerSlot,
    pub(crate) survey_dismiss: TimerSlot,
    pub(crate) speech_timeout: TimerSlot,
    pub(crate) speech_submit: TimerSlot,
    pub(crate) hint_revert: TimerSlot,
    pub(crate) speech_pump: Option<JoinHandle<()>>,
}

impl Timers {
    pub(crate) fn abort_pump(&mut self) {
        if let Some(pump) = self.speech_pump.take() {
            pump.abort();
        }
    }

    fn cancel_all(&mut self) {
        self.watchdog.cancel();
        self.survey_open.cancel();
        self.survey_dismiss.cancel();
        self.speech_timeout.cancel();
        self.speech_submit.cancel();
        self.hint_revert.cancel();
        self.abort_pump();
    }
}

pub(crate) struct Inner {
    pub(crate) is_open: bool,
    pub(crate) session: Session,
    pub(crate) transcript: Vec<Message>,
    pub(crate) input: String,
    pub(crate) typing: bool,
    // A close path is talking to the agent; blocks a second close and the watchdog.
    pub(crate) closing: bool,
    // Set by `shutdown`; work resuming after an await must not touch the widget again.
    pub(crate) disposed: bool,
    pub(crate) notice: Option<String>,
    pub(crate) input_hint: Option<InputHint>,
    pub(crate) survey: Option<SurveyState>,
    pub(crate) thumbs_in_flight: HashSet<usize>,
    pub(crate) voice: VoiceState,
    pub(crate) timers: Timers,
}

impl Inner {
    fn new() -> Self {
        Self {
            is_open: false,
            session: Session::new(),
            transcript: Vec::new(),
            input: String::new(),
            typing: false,
            closing: false,
            disposed: false,
            notice: None,
            input_hint: None,
            survey: None,
            thumbs_in_flight: HashSet::new(),
            voice: VoiceState::default(),
            timers: Timers::default(),
        }
    }

}

/// The chat widget's state machine.
///
/// Cheap to clone; all clones drive the same widget. Timers run as tokio tasks, so every
/// method must be called from within a tokio runtime. Call [`shutdown`](Self::shutdown)
/// when the widget goes away so no timer fires against a disposed session.
#[derive(Clone)]
pub struct WidgetController {
    pub(crate) inner: Arc<Mutex<Inner>>,
    pub(crate) agent: Arc<dyn AgentClient>,
    pub(crate) speech: Option<Arc<dyn SpeechRecognizer>>,
    pub(crate) cfg: Arc<WidgetConfig>,
}

impl WidgetController {
    pub fn new(cfg: WidgetConfig, agent: Arc<dyn AgentClient>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::new())),
            agent,
            speech: None,
            cfg: Arc::new(cfg),
        }
    }

    /// Enables push-to-talk. Without a recognizer the voice control stays disabled.
    pub fn with_speech(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.speech = Some(recognizer);
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.cfg
    }

    pub async fn session_id(&self) -> SessionId {
        self.inner.lock().await.session.id.clone()
    }

    pub async fn snapshot(&self) -> WidgetSnapshot {
        let inner = self.inner.lock().await;

        let thumbs_available = inner
            .transcript
            .iter()
            .enumerate()
            .filter(|(i, m)| {
                accepts_thumbs(m, &self.cfg.feedback_intents) && !inner.thumbs_in_flight.contains(i)
            })
            .map(|(i, _)| i)
            .collect();

        let suggestions = inner
            .transcript
            .last()
            .filter(|m| m.is_bot())
            .and_then(|m| m.suggestions.clone())
            .unwrap_or_default();

        WidgetSnapshot {
            is_open: inner.is_open,
            session_id: inner.session.id.clone(),
            phone_verified: inner.session.phone_verified,
            phone_input_visible: inner.session.phone_input_visible,
            transcript: inner.transcript.clone(),
            thumbs_available,
            suggestions,
            input: inner.input.clone(),
            input_hint: inner.input_hint.clone(),
            notice: inner.notice.clone(),
            typing: inner.typing,
            recording: inner.voice.recording,
            voice_available: self.speech.is_some(),
            watchdog_armed: inner.timers.watchdog.is_armed(),
            survey: inner.survey.clone(),
        }
    }

    pub async fn open(&self) {
        let mut inner = self.inner.lock().await;
        inner.is_open = true;

        if !inner.session.phone_verified {
            inner.session.phone_input_visible = true;
        }

        log::info!("widget opened (session {})", inner.session.id);
        self.rearm_watchdog(&mut inner);
    }

    /// Manual close: ends the session with the agent, hides the widget and starts a new
    /// session. The survey follows when the closed session had a conversation.
    pub async fn close(&self) {
        self.close_with(CloseReason::Manual).await;
    }

    /// Replaces the session without telling the agent and without a survey.
    pub async fn refresh_session(&self) {
        let mut inner = self.inner.lock().await;
        self.reset_session(&mut inner);
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.input = text.into();
        self.rearm_watchdog(&mut inner);
    }

    /// Sends whatever is in the input field.
    pub async fn submit(&self) -> Result<(), WidgetError> {
        let text = self.inner.lock().await.input.clone();
        self.submit_text(&text).await
    }

    /// Sends one chat turn. The transcript always gains exactly two messages: the user's
    /// text and either the agent's reply or [`FALLBACK_REPLY`].
    pub async fn submit_text(&self, text: &str) -> Result<(), WidgetError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WidgetError::EmptyMessage);
        }

        let session_id = {
            let mut inner = self.inner.lock().await;
            if inner.disposed {
                return Ok(());
            }
            if inner.typing {
                return Err(WidgetError::Busy);
            }
            inner.transcript.push(Message::user(text));
            inner.input.clear();
            inner.notice = None;
            inner.typing = true;
            inner.timers.watchdog.cancel();
            inner.session.id.clone()
        };

        let result = self.agent.chat(&session_id, text).await;

        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return Ok(());
        }
        if inner.session.id != session_id {
            log::info!("dropping chat reply for replaced session {session_id}");
            return Ok(());
        }

        inner.typing = false;
        match result {
            Ok(reply) => {
                inner.session.observe_reply(&reply.reply);
                let msg = Message::bot(reply.reply)
                    .with_intent(reply.intent)
                    .with_suggestions(reply.suggestions);
                inner.transcript.push(msg);
            }
            Err(e) => {
                log::error!("chat request failed: {e:#}");
                inner.transcript.push(Message::bot(FALLBACK_REPLY));
            }
        }

        self.rearm_watchdog(&mut inner);
        Ok(())
    }

    /// Clicks a suggestion chip of the most recent message.
    pub async fn select_suggestion(&self, index: usize) -> Result<(), WidgetError> {
        let text = {
            let inner = self.inner.lock().await;
            inner
                .transcript
                .last()
                .filter(|m| m.is_bot())
                .and_then(|m| m.suggestion(index))
                .map(str::to_string)
                .ok_or(WidgetError::SuggestionUnavailable)?
        };
        self.submit_text(&text).await
    }

    /// Phone capture form. Invalid numbers are rejected before any network call.
    pub async fn submit_identity(&self, phone: &str, email: &str) -> Result<(), WidgetError> {
        let message = {
            let mut inner = self.inner.lock().await;
            match build_identity_message(phone, email) {
                Ok(message) => {
                    inner.session.phone_input_visible = false;
                    inner.notice = None;
                    message
                }
                Err(e) => {
                    inner.notice = Some(e.notice());
                    return Err(e);
                }
            }
        };
        self.submit_text(&message).await
    }

    /// Inline thumbs feedback. Returns false when the message does not accept feedback
    /// (wrong intent, already answered, or a request for it is in flight).
    pub async fn thumbs(&self, index: usize, thumb: Thumb) -> bool {
        let session_id = {
            let mut inner = self.inner.lock().await;
            let eligible = inner
                .transcript
                .get(index)
                .map(|m| accepts_thumbs(m, &self.cfg.feedback_intents))
                .unwrap_or(false);
            if inner.disposed || !eligible || !inner.thumbs_in_flight.insert(index) {
                return false;
            }
            inner.session.id.clone()
        };

        if let Err(e) = self
            .agent
            .submit_feedback(&session_id, thumb.resolution(), thumb.satisfaction())
            .await
        {
            log::warn!("thumbs feedback failed: {e:#}");
        }

        // Marked either way so the visitor is not invited to click again.
        let mut inner = self.inner.lock().await;
        if !inner.disposed && inner.session.id == session_id {
            inner.thumbs_in_flight.remove(&index);
            if let Some(m) = inner.transcript.get_mut(index) {
                m.feedback_submitted = true;
            }
        }
        true
    }

    pub async fn choose_resolution(&self, resolved: QueryResolved) -> Result<(), WidgetError> {
        let mut inner = self.inner.lock().await;
        let survey = open_survey(&mut inner)?;
        survey.answers.query_resolved = Some(resolved);
        Ok(())
    }

    pub async fn choose_rating(&self, stars: u8) -> Result<(), WidgetError> {
        let mut inner = self.inner.lock().await;
        let rating = match Satisfaction::new(stars) {
            Ok(rating) => rating,
            Err(e) => {
                inner.notice = Some(e.notice());
                return Err(e);
            }
        };
        let survey = open_survey(&mut inner)?;
        survey.answers.satisfaction = Some(rating);
        Ok(())
    }

    /// Posts the survey. Backend failures are swallowed: the survey is handled and
    /// dismissed either way.
    pub async fn submit_survey(&self) -> Result<(), WidgetError> {
        let (session_id, resolved, satisfaction) = {
            let mut inner = self.inner.lock().await;
            let survey = open_survey(&mut inner)?;
            let answers = survey.answers.answers();
            match answers {
                Ok((resolved, satisfaction)) => {
                    survey.phase = SurveyPhase::Submitting;
                    let session_id = survey.session_id.clone();
                    inner.notice = None;
                    (session_id, resolved, satisfaction)
                }
                Err(e) => {
                    inner.notice = Some(e.notice());
                    return Err(e);
                }
            }
        };

        match self
            .agent
            .submit_feedback(&session_id, resolved, satisfaction)
            .await
        {
            Ok(()) => log::info!("session feedback submitted"),
            Err(e) => log::warn!("session feedback failed: {e:#}"),
        }

        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return Ok(());
        }
        let Some(survey) = inner.survey.as_mut() else {
            // Skipped while the request was in flight.
            return Ok(());
        };
        if survey.session_id != session_id {
            return Ok(());
        }
        survey.phase = SurveyPhase::Handled;

        let ctrl = self.clone();
        let delay = self.cfg.timings.survey_dismiss_delay();
        inner.timers.survey_dismiss.arm(delay, move |token| async move {
            ctrl.on_survey_dismiss(token).await;
        });
        Ok(())
    }

    /// Closes the survey without contacting the agent.
    pub async fn skip_survey(&self) -> Result<(), WidgetError> {
        let mut inner = self.inner.lock().await;
        let survey = inner.survey.take().ok_or(WidgetError::NoSurvey)?;
        inner.timers.survey_dismiss.cancel();
        log::info!("session feedback skipped for {}", survey.session_id);
        Ok(())
    }

    /// Unmount: cancels every pending timer and any recording in progress.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.voice.active {
            if let Some(rec) = &self.speech {
                rec.stop();
            }
        }
        inner.voice = Default::default();
        inner.timers.cancel_all();
        inner.is_open = false;
        inner.disposed = true;
        log::info!("widget shut down");
    }

    // Arms the inactivity watchdog when its preconditions hold, and cancels it otherwise.
    pub(crate) fn rearm_watchdog(&self, inner: &mut Inner) {
        inner.timers.watchdog.cancel();

        let due = inner.is_open
            && inner.transcript.len() > 1
            && !inner.typing
            && !inner.closing
            && !inner.disposed;
        if !due {
            return;
        }

        let ctrl = self.clone();
        let timeout = self.cfg.timings.inactivity_timeout();
        inner.timers.watchdog.arm(timeout, move |token| async move {
            ctrl.on_watchdog(token).await;
        });
    }

    async fn on_watchdog(&self, token: TimerToken) {
        {
            let mut inner = self.inner.lock().await;
            if !inner.timers.watchdog.claim(token) {
                return;
            }
        }

        log::info!("inactivity timeout reached");
        self.close_with(CloseReason::InactivityTimeout).await;
    }

    async fn close_with(&self, reason: CloseReason) {
        let (closing_id, survey_due) = {
            let mut inner = self.inner.lock().await;
            if inner.closing || inner.disposed {
                return;
            }
            inner.closing = true;
            inner.timers.watchdog.cancel();
            let due = inner.transcript.len() > 1;
            (inner.session.id.clone(), due)
        };

        log::info!("closing session {closing_id} ({})", reason.as_str());
        if let Err(e) = self.agent.close_session(&closing_id).await {
            log::warn!("close-session failed ({}): {e:#}", reason.as_str());
        }

        let mut inner = self.inner.lock().await;
        if inner.disposed {
            log::info!("widget shut down while closing {closing_id}");
            return;
        }
        inner.is_open = false;
        // A refresh while the close call was in flight already replaced the session.
        if inner.session.id == closing_id {
            self.reset_session(&mut inner);
        }

        if survey_due {
            let ctrl = self.clone();
            let delay = self.cfg.timings.survey_open_delay();
            inner.timers.survey_open.arm(delay, move |token| async move {
                ctrl.on_survey_open(token, closing_id).await;
            });
        }
    }

    async fn on_survey_open(&self, token: TimerToken, session_id: SessionId) {
        let mut inner = self.inner.lock().await;
        if !inner.timers.survey_open.claim(token) {
            return;
        }
        inner.timers.survey_dismiss.cancel();
        inner.survey = Some(SurveyState::new(session_id));
        log::info!("feedback survey shown");
    }

    async fn on_survey_dismiss(&self, token: TimerToken) {
        let mut inner = self.inner.lock().await;
        if !inner.timers.survey_dismiss.claim(token) {
            return;
        }
        if inner
            .survey
            .as_ref()
            .is_some_and(|s| s.phase == SurveyPhase::Handled)
        {
            inner.survey = None;
        }
    }

    fn reset_session(&self, inner: &mut Inner) {
        if inner.voice.active {
            if let Some(rec) = &self.speech {
                rec.stop();
            }
        }
        inner.voice = Default::default();
        inner.timers.watchdog.cancel();
        inner.timers.speech_timeout.cancel();
        inner.timers.speech_submit.cancel();
        inner.timers.abort_pump();

        inner.session = Session::new();
        inner.transcript.clear();
        inner.input.clear();
        inner.typing = false;
        inner.closing = false;
        inner.notice = None;
        inner.thumbs_in_flight.clear();

        log::info!("new session {}", inner.session.id);
    }
}

fn open_survey(inner: &mut Inner) -> Result<&mut SurveyState, WidgetError> {
    let survey = inner.survey.as_mut().ok_or(WidgetError::NoSurvey)?;
    if survey.phase != SurveyPhase::Open {
        return Err(WidgetError::SurveyAlreadyHandled);
    }
    Ok(survey)
}
