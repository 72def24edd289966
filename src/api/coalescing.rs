use tracing::trace;

use crate::host::{UndoStack, UndoTag};

/// Folds a continuous parameter gesture into a single undo entry.
///
/// The first edit after a selection change opens a new entry tagged with the
/// session's tag. Later edits undo that entry, snapshot again and re-apply, so
/// the entry always restores the state from before the gesture began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescingEditSession {
    tag: UndoTag,
    pending_first_edit: bool,
}

impl CoalescingEditSession {
    #[must_use]
    pub fn new(tag: UndoTag) -> Self {
        Self {
            tag,
            pending_first_edit: true,
        }
    }

    #[must_use]
    pub fn tag(self) -> UndoTag {
        self.tag
    }

    #[must_use]
    pub fn pending_first_edit(self) -> bool {
        self.pending_first_edit
    }

    pub fn on_selection_changed(&mut self) {
        self.pending_first_edit = true;
    }

    /// Records undo state for one edit tick and runs `apply` on `document`.
    pub fn on_parameter_edited<D, F>(&mut self, document: &mut D, apply: F)
    where
        D: UndoStack + ?Sized,
        F: FnOnce(&mut D),
    {
        if self.pending_first_edit || !document.match_top(self.tag) {
            trace!(tag = ?self.tag, "opening undo entry");
        } else {
            // revert the previous tick so the entry keeps the pre-gesture state
            document.undo();
        }
        document.snapshot(self.tag);
        self.pending_first_edit = false;
        apply(document);
    }
}
