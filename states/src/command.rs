use crate::StateCtx;

/// A user-triggered action executed against the state context.
///
/// Commands carry their own input, read and mutate registered states
/// synchronously, and hand any async work an [`crate::Updater`] so that its
/// results come back through [`StateCtx::sync`].
///
/// Dispatch via [`StateCtx::dispatch`].
pub trait Command {
    type Output;

    fn run(self, ctx: &mut StateCtx) -> Self::Output;
}
