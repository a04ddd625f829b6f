use crate::request::HttpRequest;
use crate::routes::AgentRoute;
use xara_core::feedback::{QueryResolved, Satisfaction};
use xara_core::types::SessionId;

pub fn build_chat_request(base_url: &str, session_id: &SessionId, text: &str) -> HttpRequest {
    HttpRequest::post_form(
        AgentRoute::Chat.url(base_url),
        vec![
            ("session_id".into(), session_id.to_string()),
            ("text".into(), text.to_string()),
        ],
    )
}

pub fn build_close_session_request(base_url: &str, session_id: &SessionId) -> HttpRequest {
    HttpRequest::post_form(
        AgentRoute::CloseSession.url(base_url),
        vec![("session_id".into(), session_id.to_string())],
    )
}

pub fn build_feedback_request(
    base_url: &str,
    session_id: &SessionId,
    resolved: QueryResolved,
    satisfaction: Satisfaction,
) -> HttpRequest {
    HttpRequest::post_form(
        AgentRoute::Feedback.url(base_url),
        vec![
            ("session_id".into(), session_id.to_string()),
            ("query_resolved".into(), resolved.as_str().into()),
            ("user_satisfaction".into(), satisfaction.get().to_string()),
        ],
    )
}
