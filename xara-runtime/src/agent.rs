use anyhow::anyhow;
use xara_core::config::AgentConfig;
use xara_core::feedback::{QueryResolved, Satisfaction};
use xara_core::types::SessionId;
use xara_engine::traits::{AgentClient, AgentReply};
use xara_providers::agent_api::{
    build_chat_request, build_close_session_request, build_feedback_request,
};
use xara_providers::parse::{parse_chat_reply, parse_close_ack, parse_feedback_ack};
use xara_providers::runtime::{HttpResponse, build_client, execute};

/// The conversational agent reached over HTTP form posts.
#[derive(Debug, Clone)]
pub struct HttpAgent {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAgent {
    pub fn new(cfg: &AgentConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        Ok(Self {
            client: build_client(cfg)?,
            base_url: cfg.base_url().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn ensure_success(what: &str, resp: &HttpResponse) -> anyhow::Result<()> {
    if resp.is_success() {
        return Ok(());
    }
    Err(anyhow!(
        "{what} request failed: status={} body={}",
        resp.status,
        String::from_utf8_lossy(&resp.body)
    ))
}

#[async_trait::async_trait]
impl AgentClient for HttpAgent {
    async fn chat(&self, session_id: &SessionId, text: &str) -> anyhow::Result<AgentReply> {
        let req = build_chat_request(&self.base_url, session_id, text);
        let resp = execute(&self.client, &req).await?;
        ensure_success("chat", &resp)?;

        let reply = parse_chat_reply(&resp.body)?;
        Ok(AgentReply {
            reply: reply.reply,
            intent: reply.intent,
            suggestions: reply.suggestions,
        })
    }

    async fn close_session(&self, session_id: &SessionId) -> anyhow::Result<()> {
        let req = build_close_session_request(&self.base_url, session_id);
        let resp = execute(&self.client, &req).await?;
        ensure_success("close-session", &resp)?;

        match parse_close_ack(&resp.body) {
            Some(ack) => log::debug!("close-session ack: {ack}"),
            None => log::warn!("close-session returned a non-JSON body"),
        }
        Ok(())
    }

    async fn submit_feedback(
        &self,
        session_id: &SessionId,
        resolved: QueryResolved,
        satisfaction: Satisfaction,
    ) -> anyhow::Result<()> {
        let req = build_feedback_request(&self.base_url, session_id, resolved, satisfaction);
        let resp = execute(&self.client, &req).await?;
        if !resp.is_success() {
            // The agent reports feedback failures as JSON with an `error` field.
            return match parse_feedback_ack(&resp.body) {
                Err(e) => {
                    Err(e.context(format!("feedback request failed: status={}", resp.status)))
                }
                Ok(()) => ensure_success("feedback", &resp),
            };
        }
        parse_feedback_ack(&resp.body)
    }
}
