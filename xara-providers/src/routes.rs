// Routes exposed by the agent origin. The widget only calls `Chat`, `CloseSession` and
// `Feedback`; the rest belong to the agent's admin surface but share the same origin
// configuration, so they are listed here for proxies and diagnostics.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRoute {
    Chat,
    CloseSession,
    Feedback,
    Diag,
    Availability,
    Evaluation,
    Logs,
    KnowledgeGap,
    Sentiment,
    Tickets,
    UploadPromotionalData,
    Stream,
}

impl AgentRoute {
    pub const ALL: [AgentRoute; 12] = [
        AgentRoute::Chat,
        AgentRoute::CloseSession,
        AgentRoute::Feedback,
        AgentRoute::Diag,
        AgentRoute::Availability,
        AgentRoute::Evaluation,
        AgentRoute::Logs,
        AgentRoute::KnowledgeGap,
        AgentRoute::Sentiment,
        AgentRoute::Tickets,
        AgentRoute::UploadPromotionalData,
        AgentRoute::Stream,
    ];

    pub fn path(self) -> &'static str {
        match self {
            AgentRoute::Chat => "/chat",
            AgentRoute::CloseSession => "/close-session",
            AgentRoute::Feedback => "/feedback",
            AgentRoute::Diag => "/diag",
            AgentRoute::Availability => "/availability",
            AgentRoute::Evaluation => "/evaluation",
            AgentRoute::Logs => "/logs",
            AgentRoute::KnowledgeGap => "/knowledge-gap",
            AgentRoute::Sentiment => "/sentiment",
            AgentRoute::Tickets => "/tickets",
            AgentRoute::UploadPromotionalData => "/upload-promotional-data",
            AgentRoute::Stream => "/ws",
        }
    }

    pub fn is_streaming(self) -> bool {
        self == AgentRoute::Stream
    }

    pub fn used_by_widget(self) -> bool {
        matches!(
            self,
            AgentRoute::Chat | AgentRoute::CloseSession | AgentRoute::Feedback
        )
    }

    /// Full URL for this route. An empty base keeps the path relative (same origin).
    pub fn url(self, base_url: &str) -> String {
        join_url(base_url, self.path())
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.is_empty() {
        return format!("/{}", path.trim_start_matches('/'));
    }
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("https://agent.example.com/", "/chat"),
            "https://agent.example.com/chat"
        );
        assert_eq!(
            join_url("https://agent.example.com", "chat"),
            "https://agent.example.com/chat"
        );
    }

    #[test]
    fn empty_base_stays_relative() {
        assert_eq!(AgentRoute::CloseSession.url(""), "/close-session");
        assert_eq!(AgentRoute::Feedback.url("  "), "/feedback");
    }

    #[test]
    fn widget_uses_exactly_three_routes() {
        let used: Vec<_> = AgentRoute::ALL
            .iter()
            .copied()
            .filter(|r| r.used_by_widget())
            .collect();
        assert_eq!(
            used,
            vec![AgentRoute::Chat, AgentRoute::CloseSession, AgentRoute::Feedback]
        );
        assert!(AgentRoute::ALL.iter().filter(|r| r.is_streaming()).count() == 1);
    }
}
