use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use xara_core::feedback::{QueryResolved, Satisfaction};
use xara_core::types::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub reply: String,
    pub intent: Option<String>,
    pub suggestions: Option<Vec<String>>,
}

impl AgentReply {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            intent: None,
            suggestions: None,
        }
    }
}

/// The remote agent. Every failure (transport, status, decoding) surfaces as `Err`.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn chat(&self, session_id: &SessionId, text: &str) -> anyhow::Result<AgentReply>;

    async fn close_session(&self, session_id: &SessionId) -> anyhow::Result<()>;

    async fn submit_feedback(
        &self,
        session_id: &SessionId,
        resolved: QueryResolved,
        satisfaction: Satisfaction,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechErrorKind {
    NoSpeech,
    NotAllowed,
    Network,
    Other(String),
}

impl SpeechErrorKind {
    pub fn hint(&self) -> &'static str {
        match self {
            SpeechErrorKind::NoSpeech => "No speech detected. Please try again.",
            SpeechErrorKind::NotAllowed => {
                "Microphone access denied. Please allow microphone access."
            }
            SpeechErrorKind::Network => "Network error. Please check your connection.",
            SpeechErrorKind::Other(_) => "Sorry, there was an error with speech recognition.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechEvent {
    Started,
    Interim(String),
    Final(String),
    Error(SpeechErrorKind),
    Ended,
}

pub type SpeechEventSender = UnboundedSender<SpeechEvent>;

/// Push-to-talk speech capture: one utterance per `start`, interim results enabled.
///
/// Implementations report progress through the sender handed to `start` and must send
/// `Ended` (or `Error`) once the utterance is over.
pub trait SpeechRecognizer: Send + Sync {
    fn start(&self, events: SpeechEventSender) -> anyhow::Result<()>;
    fn stop(&self);
}
