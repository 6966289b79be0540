use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

use flume::Sender;
use log::warn;

/// Marker for values that can be registered in a [`crate::StateCtx`].
///
/// Any `'static + Debug` type qualifies; implementing the trait is an explicit
/// opt-in so that only intended types end up in the registry.
pub trait State: Any + Debug {}

/// A deferred mutation of one registered state, applied on the owning thread.
pub(crate) type Deferred = Box<dyn FnOnce(&mut dyn Any) + Send + 'static>;

pub(crate) type Message = (TypeId, &'static str, Deferred);

/// Send-safe handle used by async continuations to post state updates.
///
/// Updates are queued and only applied when the owner calls
/// [`crate::StateCtx::sync`], so a continuation never touches state while the
/// UI thread is reading it.
#[derive(Debug, Clone)]
pub struct Updater {
    send: Sender<Message>,
}

impl Updater {
    pub(crate) fn new(send: Sender<Message>) -> Self {
        Self { send }
    }

    /// Replace the whole state value.
    pub fn set<T: State + Send>(&self, value: T) {
        self.update::<T>(move |state| *state = value);
    }

    /// Queue a closure that mutates the state in place.
    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        let deferred: Deferred = Box::new(move |any: &mut dyn Any| {
            if let Some(state) = any.downcast_mut::<T>() {
                f(state);
            }
        });

        if self
            .send
            .send((TypeId::of::<T>(), type_name::<T>(), deferred))
            .is_err()
        {
            warn!(
                "Updater: context dropped, discarding update for {}",
                type_name::<T>()
            );
        }
    }
}
