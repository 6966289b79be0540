//! Like / edit / delete / report dispatch for a single feedback row.
//!
//! Every action is a [`Command`]: it checks the row can take the action,
//! marks it in flight, issues the matching [`FeedbackMutation`] and registers
//! continuations. Continuations never touch state directly; they post through
//! an [`Updater`] and land on the next [`StateCtx::sync`].
//!
//! On success the views depending on the row's parent are invalidated:
//! - project page: `projectInfo:{project_id}`
//! - code review page: `codeInfo:{code_id}` and `codeReviewFeedbacks:{review_id}`

use log::{info, warn};
use roughcode_states::{Command, StateCtx, Updater};
use serde::{Deserialize, Serialize};

use crate::{
    CacheKey, CurrentUser, Feedback, FeedbackAction, FeedbackError, FeedbackItems, FeedbackMutation,
    IdentityProvider, ItemMode, MutationClient, MutationOptions, MutationService, Notices,
    QueryClient, REPORTED_NOTICE, sort_feedbacks,
};

/// Which page the feedback list is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentKind {
    Project,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackContext {
    pub kind: ParentKind,
    pub project_or_code_id: i64,
    pub is_mine: bool,
    /// Review whose feedback list is open; only meaningful on review pages.
    pub clicked_review_id: Option<i64>,
}

impl FeedbackContext {
    pub fn project(project_id: i64, is_mine: bool) -> Self {
        Self {
            kind: ParentKind::Project,
            project_or_code_id: project_id,
            is_mine,
            clicked_review_id: None,
        }
    }

    pub fn review(code_id: i64, clicked_review_id: i64, is_mine: bool) -> Self {
        Self {
            kind: ParentKind::Review,
            project_or_code_id: code_id,
            is_mine,
            clicked_review_id: Some(clicked_review_id),
        }
    }

    /// Derive `is_mine` from the signed-in user.
    pub fn with_identity(mut self, feedback: &Feedback, identity: &dyn IdentityProvider) -> Self {
        self.is_mine = identity.is_mine(feedback);
        self
    }

    /// Cached views to refresh after a successful mutation.
    pub fn invalidation_keys(&self) -> Vec<CacheKey> {
        match self.kind {
            ParentKind::Project => vec![CacheKey::project_info(self.project_or_code_id)],
            ParentKind::Review => {
                let mut keys = vec![CacheKey::code_info(self.project_or_code_id)];
                match self.clicked_review_id {
                    Some(review_id) => keys.push(CacheKey::code_review_feedbacks(review_id)),
                    None => warn!(
                        "FeedbackContext: review page for code {} has no clicked review",
                        self.project_or_code_id
                    ),
                }
                keys
            }
        }
    }
}

/// Outcome of dispatching an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Issued,
    /// The same action is still in flight for this row; nothing was sent.
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackTarget {
    pub feedback: Feedback,
    pub context: FeedbackContext,
}

impl FeedbackTarget {
    fn ensure(&self, ctx: &StateCtx, action: FeedbackAction) -> Result<(), FeedbackError> {
        if self.feedback.is_redacted() {
            return Err(FeedbackError::Redacted);
        }

        let allowed = match action {
            FeedbackAction::Like => true,
            FeedbackAction::Edit => self.context.is_mine,
            FeedbackAction::Delete | FeedbackAction::Report => {
                self.feedback
                    .options(self.context.is_mine)
                    .contains(&action)
            }
        };
        if !allowed {
            return Err(FeedbackError::ActionUnavailable(action));
        }

        let editing = ctx
            .state::<FeedbackItems>()
            .get(self.feedback.id())
            .is_some_and(|item| item.is_editing());
        match (action, editing) {
            (FeedbackAction::Edit, false) => Err(FeedbackError::NotEditing),
            (FeedbackAction::Like | FeedbackAction::Delete | FeedbackAction::Report, true) => {
                Err(FeedbackError::Editing)
            }
            _ => Ok(()),
        }
    }

    fn is_pending(&self, ctx: &StateCtx, action: FeedbackAction) -> bool {
        ctx.state::<FeedbackItems>()
            .get(self.feedback.id())
            .is_some_and(|item| item.is_pending(action))
    }
}

fn issue(
    ctx: &mut StateCtx,
    target: &FeedbackTarget,
    action: FeedbackAction,
    mutation: FeedbackMutation,
    on_success: impl FnOnce(&Updater) + Send + 'static,
    on_settled: impl FnOnce(&Updater) + Send + 'static,
) -> Dispatch {
    let id = target.feedback.id();
    if !ctx.state_mut::<FeedbackItems>().begin_action(id, action) {
        return Dispatch::AlreadyPending;
    }

    let service = ctx.state::<MutationClient>().inner.clone();
    let keys = target.context.invalidation_keys();
    let success_updater = ctx.updater();
    let settled_updater = ctx.updater();

    let options = MutationOptions::new()
        .on_success(move || {
            success_updater.update::<QueryClient>(move |client| client.invalidate_all(keys));
            on_success(&success_updater);
        })
        .on_error(move |err| {
            warn!("FeedbackReconciler: {action:?} on {id:?} failed: {err}");
        })
        .on_settled(move || {
            // Posted last so a cleared pending flag means every continuation landed.
            on_settled(&settled_updater);
            settled_updater.update::<FeedbackItems>(move |items| items.settle_action(id, action));
        });

    info!("FeedbackReconciler: issuing {mutation:?}");
    service.mutate(mutation, options.into_callback());
    Dispatch::Issued
}

/// Toggle the current user's like.
#[derive(Debug, Clone)]
pub struct LikeFeedbackCommand {
    pub target: FeedbackTarget,
}

impl Command for LikeFeedbackCommand {
    type Output = Result<Dispatch, FeedbackError>;

    fn run(self, ctx: &mut StateCtx) -> Self::Output {
        self.target.ensure(ctx, FeedbackAction::Like)?;
        let mutation = FeedbackMutation::Like(self.target.feedback.id());
        Ok(issue(
            ctx,
            &self.target,
            FeedbackAction::Like,
            mutation,
            |_| {},
            |_| {},
        ))
    }
}

/// Replace the feedback text; leaves edit mode on success.
#[derive(Debug, Clone)]
pub struct EditFeedbackCommand {
    pub target: FeedbackTarget,
    pub content: String,
}

impl Command for EditFeedbackCommand {
    type Output = Result<Dispatch, FeedbackError>;

    fn run(self, ctx: &mut StateCtx) -> Self::Output {
        self.target.ensure(ctx, FeedbackAction::Edit)?;
        self.target.feedback.validate_edit(&self.content)?;

        let id = self.target.feedback.id();
        let mutation = FeedbackMutation::Edit {
            id,
            content: self.content,
        };
        Ok(issue(
            ctx,
            &self.target,
            FeedbackAction::Edit,
            mutation,
            move |updater| updater.update::<FeedbackItems>(move |items| items.finish_edit(id)),
            |_| {},
        ))
    }
}

/// Remove the feedback; its row state is dropped on success.
#[derive(Debug, Clone)]
pub struct DeleteFeedbackCommand {
    pub target: FeedbackTarget,
}

impl Command for DeleteFeedbackCommand {
    type Output = Result<Dispatch, FeedbackError>;

    fn run(self, ctx: &mut StateCtx) -> Self::Output {
        self.target.ensure(ctx, FeedbackAction::Delete)?;

        let id = self.target.feedback.id();
        let mutation = FeedbackMutation::Delete(id);
        Ok(issue(
            ctx,
            &self.target,
            FeedbackAction::Delete,
            mutation,
            move |updater| updater.update::<FeedbackItems>(move |items| items.remove(id)),
            |_| {},
        ))
    }
}

/// File a complaint. The options-menu lock is released right before the
/// request goes out and engaged again when it settles, whatever the outcome.
#[derive(Debug, Clone)]
pub struct ReportFeedbackCommand {
    pub target: FeedbackTarget,
}

impl Command for ReportFeedbackCommand {
    type Output = Result<Dispatch, FeedbackError>;

    fn run(self, ctx: &mut StateCtx) -> Self::Output {
        self.target.ensure(ctx, FeedbackAction::Report)?;
        if self.target.is_pending(ctx, FeedbackAction::Report) {
            return Ok(Dispatch::AlreadyPending);
        }

        let id = self.target.feedback.id();
        ctx.state_mut::<FeedbackItems>().set_force_close(id, false);

        let mutation = FeedbackMutation::Report(id);
        Ok(issue(
            ctx,
            &self.target,
            FeedbackAction::Report,
            mutation,
            |updater| updater.update::<Notices>(|notices| notices.push(REPORTED_NOTICE)),
            move |updater| {
                updater.update::<FeedbackItems>(move |items| items.set_force_close(id, true));
            },
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeControl {
    pub count: u32,
    pub liked: bool,
    pub pending: bool,
}

/// Everything a feedback row needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackView {
    pub display_name: String,
    pub content: String,
    pub redacted: bool,
    /// Shown next to the name for adopted project feedback.
    pub adopted_marker: Option<&'static str>,
    /// `None` hides the like control.
    pub like: Option<LikeControl>,
    pub options: Vec<FeedbackAction>,
    pub force_close: bool,
    pub date: String,
    pub mode: ItemMode,
}

/// Facade over the feedback commands for one rendered row.
#[derive(Debug, Clone)]
pub struct FeedbackReconciler {
    target: FeedbackTarget,
}

impl FeedbackReconciler {
    pub fn new(feedback: Feedback, context: FeedbackContext) -> Self {
        Self {
            target: FeedbackTarget { feedback, context },
        }
    }

    /// Build a row whose ownership comes from the registered [`CurrentUser`].
    pub fn for_current_user(ctx: &StateCtx, feedback: Feedback, context: FeedbackContext) -> Self {
        let context = context.with_identity(&feedback, ctx.state::<CurrentUser>());
        Self::new(feedback, context)
    }

    pub fn feedback(&self) -> &Feedback {
        &self.target.feedback
    }

    pub fn view(&self, ctx: &StateCtx) -> FeedbackView {
        let feedback = &self.target.feedback;
        let item = ctx.state::<FeedbackItems>().item(feedback.id());

        FeedbackView {
            display_name: feedback.display_name().to_owned(),
            content: feedback.display_content().to_owned(),
            redacted: feedback.is_redacted(),
            adopted_marker: feedback.is_adopted().then_some(crate::ADOPTED_MARKER),
            like: feedback.can_like().then(|| LikeControl {
                count: feedback.like_count(),
                liked: feedback.liked(),
                pending: item.is_pending(FeedbackAction::Like),
            }),
            options: feedback.options(self.target.context.is_mine).to_vec(),
            force_close: item.force_close,
            date: feedback.display_date(),
            mode: item.mode,
        }
    }

    pub fn like(&self, ctx: &mut StateCtx) -> Result<Dispatch, FeedbackError> {
        ctx.dispatch(LikeFeedbackCommand {
            target: self.target.clone(),
        })
    }

    pub fn begin_edit(&self, ctx: &mut StateCtx) -> Result<(), FeedbackError> {
        ctx.state_mut::<FeedbackItems>()
            .begin_edit(&self.target.feedback, self.target.context.is_mine)
    }

    pub fn cancel_edit(&self, ctx: &mut StateCtx) {
        ctx.state_mut::<FeedbackItems>()
            .cancel_edit(self.target.feedback.id());
    }

    pub fn edit(
        &self,
        ctx: &mut StateCtx,
        new_content: impl Into<String>,
    ) -> Result<Dispatch, FeedbackError> {
        ctx.dispatch(EditFeedbackCommand {
            target: self.target.clone(),
            content: new_content.into(),
        })
    }

    /// Submit the draft typed into the edit input.
    pub fn commit_edit(&self, ctx: &mut StateCtx) -> Result<Dispatch, FeedbackError> {
        let draft = ctx
            .state::<FeedbackItems>()
            .get(self.target.feedback.id())
            .and_then(|item| item.draft().map(str::to_owned))
            .ok_or(FeedbackError::NotEditing)?;
        self.edit(ctx, draft)
    }

    pub fn delete(&self, ctx: &mut StateCtx) -> Result<Dispatch, FeedbackError> {
        ctx.dispatch(DeleteFeedbackCommand {
            target: self.target.clone(),
        })
    }

    pub fn report(&self, ctx: &mut StateCtx) -> Result<Dispatch, FeedbackError> {
        ctx.dispatch(ReportFeedbackCommand {
            target: self.target.clone(),
        })
    }
}

/// Order a feedback list for the signed-in [`CurrentUser`].
pub fn sort_for_current_user(ctx: &StateCtx, feedbacks: &mut [Feedback]) {
    sort_feedbacks(feedbacks, ctx.state::<CurrentUser>().user_id());
}

/// Register the states the feedback commands rely on.
pub fn register_feedback_states(ctx: &mut StateCtx, service: impl MutationService + 'static) {
    ctx.add_state(MutationClient::new(service));
    ctx.add_state(FeedbackItems::default());
    ctx.add_state(QueryClient::new());
    ctx.add_state(Notices::default());
}
