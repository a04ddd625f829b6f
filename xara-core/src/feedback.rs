use crate::error::WidgetError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryResolved {
    Yes,
    Neutral,
    No,
}

impl QueryResolved {
    /// Wire value for the `query_resolved` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryResolved::Yes => "Yes",
            QueryResolved::Neutral => "Neutral",
            QueryResolved::No => "No",
        }
    }
}

/// Star rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Satisfaction(u8);

impl Satisfaction {
    pub const MIN: Satisfaction = Satisfaction(1);
    pub const MAX: Satisfaction = Satisfaction(5);

    pub fn new(stars: u8) -> Result<Self, WidgetError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(WidgetError::InvalidRating(stars))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Satisfaction {
    type Error = WidgetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Satisfaction> for u8 {
    fn from(value: Satisfaction) -> Self {
        value.0
    }
}

/// End-of-session survey answers. Both must be set before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackSurvey {
    pub query_resolved: Option<QueryResolved>,
    pub satisfaction: Option<Satisfaction>,
}

impl FeedbackSurvey {
    pub fn is_complete(&self) -> bool {
        self.query_resolved.is_some() && self.satisfaction.is_some()
    }

    pub fn answers(&self) -> Result<(QueryResolved, Satisfaction), WidgetError> {
        match (self.query_resolved, self.satisfaction) {
            (Some(r), Some(s)) => Ok((r, s)),
            _ => Err(WidgetError::SurveyIncomplete),
        }
    }
}
