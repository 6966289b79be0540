//! Fakes and fixtures for business layer unit tests.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use roughcode_states::StateCtx;

use crate::{
    ApiResult, BusinessConfig, CodeReviewFeedback, Feedback, FeedbackMutation, MutationCallback,
    MutationService, ProjectFeedback, build_state_ctx,
};

#[derive(Default)]
struct Recorded {
    issued: Vec<FeedbackMutation>,
    waiting: VecDeque<(FeedbackMutation, MutationCallback)>,
}

/// Mutation service that records requests and lets the test decide when and
/// how each one resolves.
#[derive(Clone, Default)]
pub struct RecordingMutationService {
    inner: Arc<Mutex<Recorded>>,
}

impl fmt::Debug for RecordingMutationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recorded = self.lock();
        f.debug_struct("RecordingMutationService")
            .field("issued", &recorded.issued)
            .field("waiting", &recorded.waiting.len())
            .finish()
    }
}

impl RecordingMutationService {
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn issued(&self) -> Vec<FeedbackMutation> {
        self.lock().issued.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().waiting.len()
    }

    /// Resolve the oldest outstanding request.
    pub fn resolve_next(&self, result: ApiResult<()>) -> Option<FeedbackMutation> {
        let (mutation, callback) = self.lock().waiting.pop_front()?;
        callback(result);
        Some(mutation)
    }
}

impl MutationService for RecordingMutationService {
    fn mutate(&self, mutation: FeedbackMutation, on_done: MutationCallback) {
        let mut recorded = self.lock();
        recorded.issued.push(mutation.clone());
        recorded.waiting.push_back((mutation, on_done));
    }
}

pub fn test_ctx() -> (StateCtx, RecordingMutationService) {
    let service = RecordingMutationService::default();
    let ctx = build_state_ctx(BusinessConfig::new("http://localhost"), service.clone());
    (ctx, service)
}

fn date() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 5, 10)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap_or_default()
}

pub fn project_feedback(id: i64, user_name: &str, content: &str, selected: u32) -> Feedback {
    Feedback::Project(ProjectFeedback {
        feedback_id: id,
        user_id: if user_name.is_empty() { 0 } else { 1 },
        user_name: user_name.to_owned(),
        content: content.to_owned(),
        like: 3,
        selected,
        liked: false,
        date: date(),
    })
}

pub fn review_feedback(id: i64, user_name: &str, content: &str) -> Feedback {
    Feedback::CodeReview(CodeReviewFeedback {
        re_review_id: id,
        user_id: if user_name.is_empty() { 0 } else { 2 },
        user_name: user_name.to_owned(),
        liked: true,
        like: 1,
        content: content.to_owned(),
        date: date(),
    })
}
