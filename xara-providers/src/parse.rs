use anyhow::{Context, anyhow};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

pub fn parse_chat_reply(body: &[u8]) -> anyhow::Result<ChatReply> {
    let reply: ChatReply = serde_json::from_slice(body).context("decode chat JSON")?;
    Ok(reply)
}

#[derive(Debug, Deserialize)]
struct FeedbackAck {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

/// Accepts only `{"status":"success"}`; anything else becomes an error carrying the
/// agent's own message when it sent one.
pub fn parse_feedback_ack(body: &[u8]) -> anyhow::Result<()> {
    let ack: FeedbackAck = serde_json::from_slice(body).context("decode feedback JSON")?;
    if ack.status == "success" {
        return Ok(());
    }
    Err(anyhow!(
        ack.error
            .unwrap_or_else(|| "Failed to submit feedback".to_string())
    ))
}

/// The close acknowledgement is informational; a non-JSON body is not an error.
pub fn parse_close_ack(body: &[u8]) -> Option<serde_json::Value> {
    serde_json::from_slice(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_chat_reply() {
        let body = br#"{"reply":"We open at 9.","intent":"general_inquiry","suggestions":["Book now"]}"#;
        let r = parse_chat_reply(body).unwrap();
        assert_eq!(r.reply, "We open at 9.");
        assert_eq!(r.intent.as_deref(), Some("general_inquiry"));
        assert_eq!(r.suggestions, Some(vec!["Book now".to_string()]));
    }

    #[test]
    fn optional_chat_fields_may_be_null_or_missing() {
        let r = parse_chat_reply(br#"{"reply":"hi","intent":null}"#).unwrap();
        assert_eq!(r.intent, None);
        assert_eq!(r.suggestions, None);
    }

    #[test]
    fn chat_without_reply_errors() {
        assert!(parse_chat_reply(br#"{"intent":"x"}"#).is_err());
        assert!(parse_chat_reply(b"<html>bad gateway</html>").is_err());
    }

    #[test]
    fn feedback_ack_requires_success() {
        assert!(parse_feedback_ack(br#"{"status":"success"}"#).is_ok());

        let err = parse_feedback_ack(br#"{"status":"error","error":"db down"}"#).unwrap_err();
        assert_eq!(err.to_string(), "db down");

        assert!(parse_feedback_ack(b"not json").is_err());
    }

    #[test]
    fn close_ack_tolerates_plain_text() {
        assert!(parse_close_ack(br#"{"status":"closed"}"#).is_some());
        assert!(parse_close_ack(b"ok").is_none());
    }
}
