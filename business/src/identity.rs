use roughcode_states::State;

use crate::Feedback;

/// Who is looking at the page.
pub trait IdentityProvider {
    /// Nickname of the signed-in user, `None` when signed out.
    fn nickname(&self) -> Option<&str>;

    fn user_id(&self) -> Option<i64> {
        None
    }

    /// A feedback is "mine" when its author name equals the current nickname
    /// exactly. Anonymous feedback is never mine.
    fn is_mine(&self, feedback: &Feedback) -> bool {
        self.nickname()
            .is_some_and(|nickname| feedback.is_authored_by(nickname))
    }
}

/// Session user, filled in by the auth layer after sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Option<i64>,
    pub nickname: Option<String>,
}

impl CurrentUser {
    pub fn signed_in(user_id: i64, nickname: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            nickname: Some(nickname.into()),
        }
    }
}

impl IdentityProvider for CurrentUser {
    fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

impl State for CurrentUser {}
