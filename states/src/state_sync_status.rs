/// Change tracking for a registered state.
///
/// Readers that derive work from a state (for example a list fetcher reading
/// search criteria) check for `Dirty` and mark the state `Clean` once they have
/// caught up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSyncStatus {
    /// Registered and never changed since.
    #[default]
    Init,
    Dirty,
    Clean,
}

impl StateSyncStatus {
    pub fn is_dirty(self) -> bool {
        matches!(self, Self::Dirty)
    }
}
