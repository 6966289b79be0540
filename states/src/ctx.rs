use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;
use std::fmt;

use flume::{Receiver, Sender};
use log::{debug, warn};

use crate::state::Message;
use crate::{Command, Error, State, StateSyncStatus, Updater};

struct Slot {
    name: &'static str,
    value: Box<dyn Any>,
    status: StateSyncStatus,
}

/// Typed registry of application state, owned by the composition root.
///
/// Every state is registered once with [`StateCtx::add_state`] and then
/// accessed by type. Mutation happens either directly on the owning thread or
/// through an [`Updater`] whose queued updates are applied by [`StateCtx::sync`].
pub struct StateCtx {
    send: Sender<Message>,
    recv: Receiver<Message>,

    storage: BTreeMap<TypeId, Slot>,
}

impl fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for slot in self.storage.values() {
            map.entry(&slot.name, &slot.status);
        }
        map.finish()
    }
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            send,
            recv,
            storage: BTreeMap::new(),
        }
    }

    /// Register a state. Re-registering the same type replaces the value and
    /// resets its sync status.
    pub fn add_state<T: State>(&mut self, state: T) {
        let name = type_name::<T>();
        if self.storage.contains_key(&TypeId::of::<T>()) {
            debug!("StateCtx: replacing registered state {name}");
        }
        self.storage.insert(
            TypeId::of::<T>(),
            Slot {
                name,
                value: Box::new(state),
                status: StateSyncStatus::Init,
            },
        );
    }

    /// Register a state, failing if the type is already present.
    pub fn try_add_state<T: State>(&mut self, state: T) -> Result<(), Error> {
        if self.has_state::<T>() {
            return Err(Error::AlreadyRegistered {
                name: type_name::<T>(),
            });
        }
        self.add_state(state);
        Ok(())
    }

    pub fn has_state<T: State>(&self) -> bool {
        self.storage.contains_key(&TypeId::of::<T>())
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.storage
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "read"))
    }

    /// Read a registered state.
    ///
    /// # Panics
    /// Panics if `T` was never registered; registration is part of wiring the
    /// application, not a runtime condition.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_state_mut<T: State>(&mut self) -> Result<&mut T, Error> {
        let slot = self
            .storage
            .get_mut(&TypeId::of::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "write"))?;
        slot.status = StateSyncStatus::Dirty;
        slot.value
            .downcast_mut::<T>()
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "downcast"))
    }

    /// Mutable access to a registered state. Marks it dirty.
    ///
    /// # Panics
    /// Panics if `T` was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.try_state_mut::<T>()
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Mutate a registered state in place.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        f(self.state_mut::<T>());
    }

    pub fn status<T: State>(&self) -> Option<StateSyncStatus> {
        self.storage.get(&TypeId::of::<T>()).map(|slot| slot.status)
    }

    pub fn mark_clean<T: State>(&mut self) {
        if let Some(slot) = self.storage.get_mut(&TypeId::of::<T>()) {
            slot.status = StateSyncStatus::Clean;
        }
    }

    /// A handle for posting updates from async continuations.
    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Apply every queued update, in the order they were posted.
    ///
    /// Returns the number of updates applied. Updates for unregistered types
    /// are dropped with a warning.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((id, name, deferred)) = self.recv.try_recv() {
            match self.storage.get_mut(&id) {
                Some(slot) => {
                    deferred(slot.value.as_mut());
                    slot.status = StateSyncStatus::Dirty;
                    applied += 1;
                }
                None => warn!("StateCtx: dropping update for unregistered state {name}"),
            }
        }
        applied
    }

    /// Number of updates waiting for [`StateCtx::sync`].
    pub fn pending_updates(&self) -> usize {
        self.recv.len()
    }

    pub fn dispatch<C: Command>(&mut self, command: C) -> C::Output {
        command.run(self)
    }
}
