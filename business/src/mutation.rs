use std::fmt::Debug;
use std::sync::Arc;

use roughcode_states::State;
use serde::Serialize;

use crate::{ApiResult, FeedbackId};

/// One remote write on a feedback. Together with the [`FeedbackId`] variant
/// this covers the eight (entity × action) endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackMutation {
    Like(FeedbackId),
    Edit { id: FeedbackId, content: String },
    Delete(FeedbackId),
    Report(FeedbackId),
}

/// Body of the edit endpoints. Project feedback is keyed by `feedbackId`,
/// code review feedback by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EditFeedbackRequest {
    #[serde(rename_all = "camelCase")]
    Project { feedback_id: i64, content: String },
    CodeReview { id: i64, content: String },
}

impl EditFeedbackRequest {
    pub fn new(id: FeedbackId, content: String) -> Self {
        match id {
            FeedbackId::Project(feedback_id) => Self::Project {
                feedback_id,
                content,
            },
            FeedbackId::CodeReview(id) => Self::CodeReview { id, content },
        }
    }
}

pub type MutationCallback = Box<dyn FnOnce(ApiResult<()>) + Send + 'static>;

/// The data layer's write side.
///
/// `on_done` is invoked exactly once when the request resolves, possibly on
/// another thread.
pub trait MutationService: Send + Sync + Debug {
    fn mutate(&self, mutation: FeedbackMutation, on_done: MutationCallback);
}

type Hook = Box<dyn FnOnce() + Send + 'static>;

/// `on_success` / `on_settled` continuations for one mutation.
///
/// `on_success` runs first, only for `Ok`; `on_settled` runs afterwards for
/// every outcome.
#[derive(Default)]
pub struct MutationOptions {
    on_success: Option<Hook>,
    on_settled: Option<Hook>,
    on_error: Option<Box<dyn FnOnce(&crate::ApiError) + Send + 'static>>,
}

impl MutationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_settled(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_settled = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&crate::ApiError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn into_callback(self) -> MutationCallback {
        Box::new(move |result| {
            match result {
                Ok(()) => {
                    if let Some(f) = self.on_success {
                        f();
                    }
                }
                Err(err) => {
                    if let Some(f) = self.on_error {
                        f(&err);
                    }
                }
            }
            if let Some(f) = self.on_settled {
                f();
            }
        })
    }
}

/// Registered mutation backend.
#[derive(Debug, Clone)]
pub struct MutationClient {
    pub inner: Arc<dyn MutationService>,
}

impl MutationClient {
    pub fn new(service: impl MutationService + 'static) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }
}

impl State for MutationClient {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;
    use std::sync::Mutex;

    fn run(result: ApiResult<()>) -> Vec<&'static str> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());

        let callback = MutationOptions::new()
            .on_success(move || a.lock().expect("lock").push("success"))
            .on_error(move |_| b.lock().expect("lock").push("error"))
            .on_settled(move || c.lock().expect("lock").push("settled"))
            .into_callback();
        callback(result);

        let calls = calls.lock().expect("lock");
        calls.clone()
    }

    #[test]
    fn success_runs_before_settled() {
        assert_eq!(run(Ok(())), vec!["success", "settled"]);
    }

    #[test]
    fn failure_skips_success() {
        assert_eq!(
            run(Err(ApiError::Network("offline".to_owned()))),
            vec!["error", "settled"]
        );
    }

    #[test]
    fn edit_body_shapes() {
        let project = EditFeedbackRequest::new(FeedbackId::Project(5), "a".to_owned());
        assert_eq!(
            serde_json::to_value(&project).ok(),
            Some(serde_json::json!({ "feedbackId": 5, "content": "a" }))
        );

        let review = EditFeedbackRequest::new(FeedbackId::CodeReview(7), "b".to_owned());
        assert_eq!(
            serde_json::to_value(&review).ok(),
            Some(serde_json::json!({ "id": 7, "content": "b" }))
        );
    }
}
