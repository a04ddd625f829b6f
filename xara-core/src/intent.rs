use crate::types::Message;

/// Informational intents that accept inline thumbs feedback.
pub const DEFAULT_FEEDBACK_INTENTS: [&str; 6] = [
    "location_info",
    "parking_info",
    "directions",
    "general_inquiry",
    "aftercare",
    "promotions",
];

pub fn default_feedback_intents() -> Vec<String> {
    DEFAULT_FEEDBACK_INTENTS.iter().map(|s| s.to_string()).collect()
}

/// A message takes thumbs feedback at most once, and only for allow-listed bot intents.
pub fn accepts_thumbs(message: &Message, allow_list: &[String]) -> bool {
    if !message.is_bot() || message.feedback_submitted {
        return false;
    }

    message
        .intent
        .as_deref()
        .map(|intent| allow_list.iter().any(|a| a == intent))
        .unwrap_or(false)
}
