//! Per-item UI state for rendered feedback.
//!
//! Each feedback row is either being viewed or being edited. Alongside that
//! mode every row tracks the options-menu lock used while a report is in
//! flight, and which actions currently have a request outstanding.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use roughcode_states::State;

use crate::{Feedback, FeedbackAction, FeedbackError, FeedbackId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemMode {
    #[default]
    Viewing,
    Editing {
        draft: String,
        /// Set on entering edit mode, consumed by the input widget.
        focus_requested: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackItemState {
    pub mode: ItemMode,
    /// Forces the options menu closed. Dropped to `false` right before a report
    /// is sent and raised again once it settles.
    pub force_close: bool,
    pending: BTreeSet<FeedbackAction>,
}

impl FeedbackItemState {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ItemMode::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.mode {
            ItemMode::Editing { draft, .. } => Some(draft),
            ItemMode::Viewing => None,
        }
    }

    pub fn is_pending(&self, action: FeedbackAction) -> bool {
        self.pending.contains(&action)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// All feedback rows known to the current view, keyed by identity.
#[derive(Debug, Default)]
pub struct FeedbackItems {
    items: HashMap<FeedbackId, FeedbackItemState>,
}

impl State for FeedbackItems {}

impl FeedbackItems {
    pub fn get(&self, id: FeedbackId) -> Option<&FeedbackItemState> {
        self.items.get(&id)
    }

    /// State of a row, defaulting to viewing for rows never touched.
    pub fn item(&self, id: FeedbackId) -> FeedbackItemState {
        self.items.get(&id).cloned().unwrap_or_default()
    }

    fn entry(&mut self, id: FeedbackId) -> &mut FeedbackItemState {
        self.items.entry(id).or_default()
    }

    /// `Viewing -> Editing`. Only the author may edit, and never a redacted
    /// feedback.
    pub fn begin_edit(&mut self, feedback: &Feedback, is_mine: bool) -> Result<(), FeedbackError> {
        if feedback.is_redacted() {
            return Err(FeedbackError::Redacted);
        }
        if !is_mine {
            return Err(FeedbackError::ActionUnavailable(FeedbackAction::Edit));
        }
        let item = self.entry(feedback.id());
        if item.is_editing() {
            return Err(FeedbackError::Editing);
        }
        item.mode = ItemMode::Editing {
            draft: feedback.content().to_owned(),
            focus_requested: true,
        };
        Ok(())
    }

    pub fn set_draft(
        &mut self,
        id: FeedbackId,
        text: impl Into<String>,
    ) -> Result<(), FeedbackError> {
        match &mut self.entry(id).mode {
            ItemMode::Editing { draft, .. } => {
                *draft = text.into();
                Ok(())
            }
            ItemMode::Viewing => Err(FeedbackError::NotEditing),
        }
    }

    /// Returns `true` once per entry into edit mode.
    pub fn take_focus_request(&mut self, id: FeedbackId) -> bool {
        match self.items.get_mut(&id).map(|item| &mut item.mode) {
            Some(ItemMode::Editing {
                focus_requested, ..
            }) => std::mem::take(focus_requested),
            _ => false,
        }
    }

    pub fn cancel_edit(&mut self, id: FeedbackId) {
        if let Some(item) = self.items.get_mut(&id) {
            item.mode = ItemMode::Viewing;
        }
    }

    /// `Editing -> Viewing` after a successful edit.
    pub fn finish_edit(&mut self, id: FeedbackId) {
        self.cancel_edit(id);
    }

    /// Mark `action` in flight. Returns `false` if it already was.
    pub(crate) fn begin_action(&mut self, id: FeedbackId, action: FeedbackAction) -> bool {
        let inserted = self.entry(id).pending.insert(action);
        if !inserted {
            debug!("FeedbackItems: {action:?} already in flight for {id:?}");
        }
        inserted
    }

    pub(crate) fn settle_action(&mut self, id: FeedbackId, action: FeedbackAction) {
        if let Some(item) = self.items.get_mut(&id) {
            item.pending.remove(&action);
        }
    }

    pub(crate) fn set_force_close(&mut self, id: FeedbackId, force_close: bool) {
        self.entry(id).force_close = force_close;
    }

    /// Forget a row whose feedback no longer exists.
    pub(crate) fn remove(&mut self, id: FeedbackId) {
        if self.items.remove(&id).is_some() {
            debug!("FeedbackItems: dropped state for {id:?}");
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
