//! Feedback entities attached to a project or to a code review.
//!
//! The backend sends two shapes that differ by their identity field
//! (`feedbackId` vs `reReviewId`). They are classified exactly once, when the
//! payload is decoded; everything past that point matches on [`Feedback`].

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

use crate::{FeedbackError, MAX_FEEDBACK_CHARS};

pub const ANONYMOUS_NAME: &str = "익명";
pub const REDACTED_TEXT: &str = "신고되어 가려진 게시물입니다.";
pub const ADOPTED_MARKER: &str = "프로젝트에 반영됨";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFeedback {
    pub feedback_id: i64,
    /// `0` for anonymous authors.
    pub user_id: i64,
    pub user_name: String,
    /// Empty once the feedback was hidden after a report.
    pub content: String,
    pub like: u32,
    /// How many times the project owner adopted this feedback.
    pub selected: u32,
    pub liked: bool,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReviewFeedback {
    pub re_review_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub liked: bool,
    pub like: u32,
    pub content: String,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Feedback {
    Project(ProjectFeedback),
    CodeReview(CodeReviewFeedback),
}

/// Identity of a feedback, which is also the key of every mutation on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedbackId {
    Project(i64),
    CodeReview(i64),
}

impl FeedbackId {
    pub fn raw(self) -> i64 {
        match self {
            Self::Project(id) | Self::CodeReview(id) => id,
        }
    }
}

/// Entries of the per-item options menu, plus the like control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedbackAction {
    Like,
    Edit,
    Delete,
    Report,
}

impl<'de> Deserialize<'de> for Feedback {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

impl Feedback {
    /// Classify a raw payload by its identity field and decode it.
    pub fn from_value(value: Value) -> Result<Self, FeedbackError> {
        if value.get("feedbackId").is_some() {
            Ok(Self::Project(serde_json::from_value(value)?))
        } else if value.get("reReviewId").is_some() {
            Ok(Self::CodeReview(serde_json::from_value(value)?))
        } else {
            Err(FeedbackError::Unclassified)
        }
    }

    pub fn id(&self) -> FeedbackId {
        match self {
            Self::Project(f) => FeedbackId::Project(f.feedback_id),
            Self::CodeReview(f) => FeedbackId::CodeReview(f.re_review_id),
        }
    }

    pub fn user_id(&self) -> i64 {
        match self {
            Self::Project(f) => f.user_id,
            Self::CodeReview(f) => f.user_id,
        }
    }

    pub fn user_name(&self) -> &str {
        match self {
            Self::Project(f) => &f.user_name,
            Self::CodeReview(f) => &f.user_name,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Project(f) => &f.content,
            Self::CodeReview(f) => &f.content,
        }
    }

    pub fn like_count(&self) -> u32 {
        match self {
            Self::Project(f) => f.like,
            Self::CodeReview(f) => f.like,
        }
    }

    pub fn liked(&self) -> bool {
        match self {
            Self::Project(f) => f.liked,
            Self::CodeReview(f) => f.liked,
        }
    }

    pub fn date(&self) -> NaiveDateTime {
        match self {
            Self::Project(f) => f.date,
            Self::CodeReview(f) => f.date,
        }
    }

    /// Adoption count; code review feedback has no adoption concept.
    pub fn selected(&self) -> u32 {
        match self {
            Self::Project(f) => f.selected,
            Self::CodeReview(_) => 0,
        }
    }

    pub fn is_redacted(&self) -> bool {
        self.content().is_empty()
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_name().is_empty()
    }

    pub fn is_adopted(&self) -> bool {
        self.selected() > 0
    }

    pub fn display_name(&self) -> &str {
        if self.is_anonymous() {
            ANONYMOUS_NAME
        } else {
            self.user_name()
        }
    }

    pub fn display_content(&self) -> &str {
        if self.is_redacted() {
            REDACTED_TEXT
        } else {
            self.content()
        }
    }

    pub fn display_date(&self) -> String {
        self.date().format("%y.%m.%d %H:%M").to_string()
    }

    /// Whether `nickname` authored this feedback. Anonymous feedback is never
    /// anyone's.
    pub fn is_authored_by(&self, nickname: &str) -> bool {
        !self.is_anonymous() && self.user_name() == nickname
    }

    /// Options menu entries. Editing exists but is not offered yet; redacted
    /// feedback gets no menu at all.
    pub fn options(&self, is_mine: bool) -> &'static [FeedbackAction] {
        if self.is_redacted() {
            &[]
        } else if is_mine {
            &[FeedbackAction::Delete]
        } else {
            &[FeedbackAction::Report]
        }
    }

    pub fn can_like(&self) -> bool {
        !self.is_redacted()
    }

    /// Check a replacement text before it is sent.
    pub fn validate_edit(&self, new_content: &str) -> Result<(), FeedbackError> {
        if self.is_adopted() {
            return Err(FeedbackError::Adopted);
        }
        if new_content.trim().is_empty() {
            return Err(FeedbackError::EmptyContent);
        }
        let chars = new_content.chars().count();
        if chars > MAX_FEEDBACK_CHARS {
            return Err(FeedbackError::ContentTooLong(chars));
        }
        Ok(())
    }
}

/// Order a feedback list for display: adopted first, then the current user's
/// own entries, then newest first.
pub fn sort_feedbacks(feedbacks: &mut [Feedback], current_user_id: Option<i64>) {
    let is_own = |f: &Feedback| current_user_id.is_some_and(|id| id != 0 && f.user_id() == id);

    feedbacks.sort_by(|a, b| {
        b.selected()
            .cmp(&a.selected())
            .then_with(|| match (is_own(a), is_own(b)) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => b.date().cmp(&a.date()),
            })
    });
}
