use thiserror::Error;

use crate::FeedbackAction;

/// Failure of a remote mutation, as seen by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API returned status: {status}")]
    Status { status: u16, body: String },
    #[error("Failed to serialize request: {0}")]
    Serialize(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Maximum feedback length accepted by the backend.
pub const MAX_FEEDBACK_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// Payload carries neither `feedbackId` nor `reReviewId`.
    #[error("feedback payload matches neither project nor code review shape")]
    Unclassified,
    #[error("failed to decode feedback: {0}")]
    Decode(String),
    #[error("feedback content must not be empty")]
    EmptyContent,
    #[error("feedback content exceeds 500 characters ({0})")]
    ContentTooLong(usize),
    #[error("adopted feedback cannot be edited")]
    Adopted,
    #[error("feedback was hidden after a report")]
    Redacted,
    #[error("{0:?} is not available for this feedback")]
    ActionUnavailable(FeedbackAction),
    #[error("feedback is not being edited")]
    NotEditing,
    #[error("feedback is being edited")]
    Editing,
}

impl From<serde_json::Error> for FeedbackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
