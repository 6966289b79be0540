//! State container for the roughcode client.
//!
//! A single [`StateCtx`] is created by the composition root and handed to
//! whatever needs it. Components register their states, dispatch
//! [`Command`]s, and async work reports back through an [`Updater`].

mod command;
mod ctx;
mod error;
mod state;
mod state_sync_status;

pub use command::Command;
pub use ctx::StateCtx;
pub use error::Error;
pub use state::{State, Updater};
pub use state_sync_status::StateSyncStatus;

#[cfg(test)]
mod state_ctx_test {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    impl State for Counter {}

    #[derive(Debug, Default)]
    struct Unregistered;

    impl State for Unregistered {}

    struct Increment(i32);

    impl Command for Increment {
        type Output = i32;

        fn run(self, ctx: &mut StateCtx) -> i32 {
            let counter = ctx.state_mut::<Counter>();
            counter.value += self.0;
            counter.value
        }
    }

    #[test]
    fn simple_state() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter { value: 42 });

        assert_eq!(ctx.state::<Counter>().value, 42);
        assert_eq!(ctx.status::<Counter>(), Some(StateSyncStatus::Init));
    }

    #[test]
    fn state_mut_marks_dirty() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());

        ctx.update::<Counter>(|c| c.value = 3);
        assert_eq!(ctx.status::<Counter>(), Some(StateSyncStatus::Dirty));

        ctx.mark_clean::<Counter>();
        assert_eq!(ctx.status::<Counter>(), Some(StateSyncStatus::Clean));
    }

    #[test]
    fn updater_is_deferred_until_sync() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());

        let updater = ctx.updater();
        updater.update::<Counter>(|c| c.value += 1);
        updater.update::<Counter>(|c| c.value *= 10);

        assert_eq!(ctx.state::<Counter>().value, 0);
        assert_eq!(ctx.pending_updates(), 2);

        assert_eq!(ctx.sync(), 2);
        assert_eq!(ctx.state::<Counter>().value, 10);
        assert_eq!(ctx.pending_updates(), 0);
    }

    #[test]
    fn updater_works_across_threads() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());

        let updater = ctx.updater();
        std::thread::spawn(move || updater.set(Counter { value: 7 }))
            .join()
            .expect("thread should not panic");

        ctx.sync();
        assert_eq!(ctx.state::<Counter>(), &Counter { value: 7 });
    }

    #[test]
    fn updates_for_unregistered_state_are_dropped() {
        let mut ctx = StateCtx::new();
        ctx.updater().set(Unregistered);

        assert_eq!(ctx.sync(), 0);
        assert!(ctx.try_state::<Unregistered>().is_err());
    }

    #[test]
    fn try_add_state_rejects_duplicates() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());

        assert_eq!(
            ctx.try_add_state(Counter::default()),
            Err(Error::AlreadyRegistered {
                name: std::any::type_name::<Counter>()
            })
        );
    }

    #[test]
    fn dispatch_runs_command() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());

        assert_eq!(ctx.dispatch(Increment(2)), 2);
        assert_eq!(ctx.dispatch(Increment(3)), 5);
    }

    #[test]
    #[should_panic(expected = "State not found")]
    fn reading_unregistered_state_panics() {
        let ctx = StateCtx::new();
        let _unused: &Counter = ctx.state::<Counter>();
    }
}
