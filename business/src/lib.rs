//! Business layer of the roughcode client.
//!
//! UI code stays thin:
//! - filter widgets call the [`SearchCriteriaStore`] operations
//! - the list fetcher reads the criteria through [`ProjectListQuery`]
//! - feedback rows render a [`FeedbackView`] and call [`FeedbackReconciler`]
//! - views refetch whatever the [`QueryClient`] reports as invalidated

mod config;
mod error;
mod feedback;
mod feedback_item;
pub mod http;
mod identity;
mod list_query;
mod mutation;
mod notice;
mod query_client;
mod reconciler;
mod search_criteria;

#[cfg(test)]
mod test_utils;

pub use config::{BusinessConfig, DEFAULT_PAGE_SIZE};
pub use error::{ApiError, ApiResult, FeedbackError, MAX_FEEDBACK_CHARS};
pub use feedback::{
    ADOPTED_MARKER, ANONYMOUS_NAME, CodeReviewFeedback, Feedback, FeedbackAction, FeedbackId,
    ProjectFeedback, REDACTED_TEXT, sort_feedbacks,
};
pub use feedback_item::{FeedbackItemState, FeedbackItems, ItemMode};
pub use http::HttpMutationService;
pub use identity::{CurrentUser, IdentityProvider};
pub use list_query::ProjectListQuery;
pub use mutation::{
    EditFeedbackRequest, FeedbackMutation, MutationCallback, MutationClient, MutationOptions,
    MutationService,
};
pub use notice::{Notices, REPORTED_NOTICE};
pub use query_client::{CacheKey, INVALIDATION_HISTORY, QueryClient};
pub use reconciler::{
    DeleteFeedbackCommand, Dispatch, EditFeedbackCommand, FeedbackContext, FeedbackReconciler,
    FeedbackTarget, FeedbackView, LikeControl, LikeFeedbackCommand, ParentKind,
    ReportFeedbackCommand, register_feedback_states, sort_for_current_user,
};
pub use search_criteria::{ClosedFilter, SearchCriteria, SearchCriteriaStore, SortKey, Tag};

use roughcode_states::StateCtx;

/// Composition root: a context holding every state the client uses.
pub fn build_state_ctx(
    config: BusinessConfig,
    service: impl MutationService + 'static,
) -> StateCtx {
    let mut ctx = StateCtx::new();
    ctx.add_state(SearchCriteriaStore::with_page_size(config.page_size));
    ctx.add_state(CurrentUser::default());
    ctx.add_state(config);
    register_feedback_states(&mut ctx, service);
    ctx
}
