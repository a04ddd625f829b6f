use serde::{Deserialize, Serialize};
use xara_core::feedback::FeedbackSurvey;
use xara_core::phone::is_phone_request;
use xara_core::types::{Message, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub phone_verified: bool,
    pub phone_input_visible: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phone_verified: false,
            phone_input_visible: true,
        }
    }

    /// Updates verification state from an agent reply while the session is unverified.
    pub fn observe_reply(&mut self, reply: &str) {
        if self.phone_verified {
            return;
        }

        if is_phone_request(reply) {
            self.phone_input_visible = true;
        } else {
            self.phone_verified = true;
            self.phone_input_visible = false;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Manual,
    InactivityTimeout,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::Manual => "manual close",
            CloseReason::InactivityTimeout => "inactivity timeout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyPhase {
    Open,
    Submitting,
    // Answered or failed; waiting for the dismiss delay.
    Handled,
}

/// The survey popup. It belongs to the session that was closed, not the fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyState {
    pub session_id: SessionId,
    pub answers: FeedbackSurvey,
    pub phase: SurveyPhase,
}

impl SurveyState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            answers: FeedbackSurvey::default(),
            phase: SurveyPhase::Open,
        }
    }
}

/// Transient hint shown in place of the input placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHint {
    pub text: String,
    pub is_error: bool,
}

/// Everything a front end needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    pub is_open: bool,
    pub session_id: SessionId,
    pub phone_verified: bool,
    pub phone_input_visible: bool,
    pub transcript: Vec<Message>,
    // Indices of transcript messages that currently accept thumbs feedback.
    pub thumbs_available: Vec<usize>,
    // Chips of the last message, if it is a bot message.
    pub suggestions: Vec<String>,
    pub input: String,
    pub input_hint: Option<InputHint>,
    pub notice: Option<String>,
    pub typing: bool,
    pub recording: bool,
    pub voice_available: bool,
    pub watchdog_armed: bool,
    pub survey: Option<SurveyState>,
}

impl WidgetSnapshot {
    pub fn shows_phone_form(&self) -> bool {
        self.phone_input_visible && !self.phone_verified
    }
}
