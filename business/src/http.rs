//! `reqwest`-backed [`MutationService`].
//!
//! Requests run on a tokio runtime; the completion callback is invoked from
//! that runtime's worker, which is why continuations only post through an
//! `Updater` instead of touching state.
//!
//! Endpoints, relative to [`BusinessConfig::api_url`]:
//!
//! | mutation | project feedback | code review feedback |
//! |---|---|---|
//! | like | `POST /project/feedback/{id}/like` | `POST /code/review/feedback/{id}/like` |
//! | edit | `PUT /project/feedback` | `PUT /code/review/feedback` |
//! | delete | `DELETE /project/feedback/{id}` | `DELETE /code/review/feedback/{id}` |
//! | report | `PUT /project/feedback/{id}/complaint` | `PUT /code/review/feedback/{id}/complaint` |

use log::{error, info};
use reqwest::{Client, Method, RequestBuilder};
use tokio::runtime::Handle;

use crate::{
    ApiError, ApiResult, BusinessConfig, EditFeedbackRequest, FeedbackId, FeedbackMutation,
    MutationCallback, MutationService,
};

/// Method and path (relative to the API root) for a mutation.
pub fn route(mutation: &FeedbackMutation) -> (Method, String) {
    let base = |id: FeedbackId| match id {
        FeedbackId::Project(_) => "/project/feedback",
        FeedbackId::CodeReview(_) => "/code/review/feedback",
    };

    match mutation {
        FeedbackMutation::Like(id) => (Method::POST, format!("{}/{}/like", base(*id), id.raw())),
        FeedbackMutation::Edit { id, .. } => (Method::PUT, base(*id).to_owned()),
        FeedbackMutation::Delete(id) => (Method::DELETE, format!("{}/{}", base(*id), id.raw())),
        FeedbackMutation::Report(id) => (
            Method::PUT,
            format!("{}/{}/complaint", base(*id), id.raw()),
        ),
    }
}

#[derive(Debug, Clone)]
pub struct HttpMutationService {
    client: Client,
    config: BusinessConfig,
    runtime: Handle,
}

impl HttpMutationService {
    pub fn new(config: BusinessConfig, runtime: Handle) -> Self {
        Self {
            client: Client::new(),
            config,
            runtime,
        }
    }

    fn build(&self, mutation: &FeedbackMutation) -> ApiResult<RequestBuilder> {
        let (method, path) = route(mutation);
        let url = format!("{}{path}", self.config.api_url());

        let mut request = self.client.request(method, url);
        if let Some(token) = self.config.auth_token() {
            request = request.bearer_auth(token);
        }
        if let FeedbackMutation::Edit { id, content } = mutation {
            let body = serde_json::to_vec(&EditFeedbackRequest::new(*id, content.clone()))
                .map_err(|e| ApiError::Serialize(e.to_string()))?;
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        Ok(request)
    }

    /// Issue the request and wait for its outcome.
    pub async fn send(&self, mutation: &FeedbackMutation) -> ApiResult<()> {
        let request = self.build(mutation)?;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl MutationService for HttpMutationService {
    fn mutate(&self, mutation: FeedbackMutation, on_done: MutationCallback) {
        let service = self.clone();
        self.runtime.spawn(async move {
            let result = service.send(&mutation).await;
            match &result {
                Ok(()) => info!("HttpMutationService: {mutation:?} succeeded"),
                Err(err) => error!("HttpMutationService: {mutation:?} failed: {err}"),
            }
            on_done(result);
        });
    }
}
