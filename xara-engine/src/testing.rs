// In-memory collaborators for tests and offline demos.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use xara_core::feedback::{QueryResolved, Satisfaction};
use xara_core::types::SessionId;

use crate::traits::{
    AgentClient, AgentReply, SpeechErrorKind, SpeechEvent, SpeechEventSender, SpeechRecognizer,
};

// Poisoning is ignored; the guarded data is plain records.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCall {
    Chat {
        session_id: SessionId,
        text: String,
    },
    CloseSession {
        session_id: SessionId,
    },
    Feedback {
        session_id: SessionId,
        resolved: QueryResolved,
        satisfaction: Satisfaction,
    },
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(AgentReply),
    Fail(String),
}

/// Agent double that records every call and answers from a script.
///
/// Chat turns without a scripted answer get a generic reply.
#[derive(Debug, Default)]
pub struct RecordingAgent {
    calls: Mutex<Vec<AgentCall>>,
    script: Mutex<VecDeque<Scripted>>,
    chat_delay: Mutex<Option<Duration>>,
    close_delay: Mutex<Option<Duration>>,
    fail_feedback: AtomicBool,
    fail_close: AtomicBool,
}

impl RecordingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: AgentReply) {
        lock(&self.script).push_back(Scripted::Reply(reply));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Fail(message.into()));
    }

    pub fn set_chat_delay(&self, delay: Duration) {
        *lock(&self.chat_delay) = Some(delay);
    }

    pub fn set_close_delay(&self, delay: Duration) {
        *lock(&self.close_delay) = Some(delay);
    }

    pub fn fail_feedback(&self, fail: bool) {
        self.fail_feedback.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        lock(&self.calls).clone()
    }

    pub fn chat_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AgentCall::Chat { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn close_calls(&self) -> Vec<SessionId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AgentCall::CloseSession { session_id } => Some(session_id),
                _ => None,
            })
            .collect()
    }

    pub fn feedback_calls(&self) -> Vec<(SessionId, QueryResolved, Satisfaction)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AgentCall::Feedback {
                    session_id,
                    resolved,
                    satisfaction,
                } => Some((session_id, resolved, satisfaction)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: AgentCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait::async_trait]
impl AgentClient for RecordingAgent {
    async fn chat(&self, session_id: &SessionId, text: &str) -> anyhow::Result<AgentReply> {
        self.record(AgentCall::Chat {
            session_id: session_id.clone(),
            text: text.to_string(),
        });

        let delay = *lock(&self.chat_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(AgentReply::text("Thanks! How else can I help?")),
        }
    }

    async fn close_session(&self, session_id: &SessionId) -> anyhow::Result<()> {
        self.record(AgentCall::CloseSession {
            session_id: session_id.clone(),
        });
        let delay = *lock(&self.close_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("close-session unavailable"));
        }
        Ok(())
    }

    async fn submit_feedback(
        &self,
        session_id: &SessionId,
        resolved: QueryResolved,
        satisfaction: Satisfaction,
    ) -> anyhow::Result<()> {
        self.record(AgentCall::Feedback {
            session_id: session_id.clone(),
            resolved,
            satisfaction,
        });
        if self.fail_feedback.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("feedback unavailable"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Utterance {
    Text(String),
    Error(SpeechErrorKind),
}

/// Recognizer double that "hears" queued utterances.
///
/// `start` emits `Started`, an interim result and the final transcript of the next queued
/// utterance; `stop` emits `Ended`. With nothing queued it only emits `Started`, like a
/// microphone picking up silence.
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    queue: Mutex<VecDeque<Utterance>>,
    current: Mutex<Option<SpeechEventSender>>,
    starts: AtomicU32,
    stops: AtomicU32,
    fail_start: AtomicBool,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_utterance(&self, text: impl Into<String>) {
        lock(&self.queue).push_back(Utterance::Text(text.into()));
    }

    pub fn push_error(&self, kind: SpeechErrorKind) {
        lock(&self.queue).push_back(Utterance::Error(kind));
    }

    /// Sends an arbitrary event on the active utterance. Returns false when idle.
    pub fn emit(&self, event: SpeechEvent) -> bool {
        lock(&self.current)
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    /// Makes every following `start` fail, like a platform without microphone access.
    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, events: SpeechEventSender) -> anyhow::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("recognizer service unavailable"));
        }

        let _ = events.send(SpeechEvent::Started);
        match lock(&self.queue).pop_front() {
            Some(Utterance::Text(text)) => {
                let words: Vec<&str> = text.split_whitespace().collect();
                let partial = words[..words.len().div_ceil(2)].join(" ");
                let _ = events.send(SpeechEvent::Interim(partial));
                let _ = events.send(SpeechEvent::Final(text));
            }
            Some(Utterance::Error(kind)) => {
                let _ = events.send(SpeechEvent::Error(kind));
                let _ = events.send(SpeechEvent::Ended);
                return Ok(());
            }
            None => {}
        }

        *lock(&self.current) = Some(events);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = lock(&self.current).take() {
            let _ = tx.send(SpeechEvent::Ended);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn scripted_recognizer_emits_utterance_then_end() {
        let rec = ScriptedRecognizer::new();
        rec.push_utterance("book a facial tomorrow");

        let (tx, mut rx) = mpsc::unbounded_channel();
        rec.start(tx).unwrap();
        rec.stop();

        let mut events = vec![];
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        assert_eq!(
            events,
            vec![
                SpeechEvent::Started,
                SpeechEvent::Interim("book a".into()),
                SpeechEvent::Final("book a facial tomorrow".into()),
                SpeechEvent::Ended,
            ]
        );
        assert_eq!(rec.starts(), 1);
        assert_eq!(rec.stops(), 1);
    }

    #[tokio::test]
    async fn recording_agent_replays_script_in_order() {
        let agent = RecordingAgent::new();
        agent.push_failure("boom");
        let sid = SessionId::new();

        assert!(agent.chat(&sid, "one").await.is_err());
        let reply = agent.chat(&sid, "two").await.unwrap();
        assert_eq!(reply.reply, "Thanks! How else can I help?");
        assert_eq!(agent.chat_texts(), vec!["one", "two"]);
    }
}
