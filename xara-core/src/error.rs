use thiserror::Error;

/// Synchronous rejections of a user action.
///
/// None of these perform a network call; the `Display` text is what the widget shows
/// as its notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("Please type a message first.")]
    EmptyMessage,

    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    #[error("Please answer both questions before submitting.")]
    SurveyIncomplete,

    #[error("Satisfaction must be between 1 and 5 stars.")]
    InvalidRating(u8),

    #[error("There is no feedback survey open.")]
    NoSurvey,

    #[error("Feedback for this session was already handled.")]
    SurveyAlreadyHandled,

    #[error("That suggestion is no longer available.")]
    SuggestionUnavailable,

    #[error("Please wait for the current reply.")]
    Busy,

    #[error("Voice input is not available on this device.")]
    SpeechUnavailable,
}

impl WidgetError {
    pub fn notice(&self) -> String {
        self.to_string()
    }
}
