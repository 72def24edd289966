//! Capabilities the transform engine consumes from its host application.
//!
//! The host owns every track, its selection and its undo history. Tools only
//! borrow them for the duration of a call made on the owning thread.

mod memory;

pub use memory::{ManualClock, MemoryTrack, MemoryWorkspace};

use serde::{Deserialize, Serialize};

use crate::core::{Action, TrackSnapshot};

/// Tag attached to undo snapshots so coalescing can recognize its own entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UndoTag {
    RangeExtend,
    Simplify,
    CustomScript,
}

/// Ordered action storage with a timestamp-keyed selection.
pub trait ActionTrack {
    /// Actions in ascending timestamp order.
    fn actions(&self) -> &[Action];

    /// Inserts through the host's validating path. Returns `false` when the
    /// action was rejected.
    fn add_action(&mut self, action: Action) -> bool;

    fn remove_selected(&mut self);
    fn select_all(&mut self);
    fn clear_selection(&mut self);
    fn set_selection(&mut self, action: Action, selected: bool);
    fn is_selected(&self, action: Action) -> bool;
    fn selection_size(&self) -> usize;

    /// Selected actions in track order.
    fn selection(&self) -> Vec<Action> {
        self.actions()
            .iter()
            .copied()
            .filter(|action| self.is_selected(*action))
            .collect()
    }

    fn capture_snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            actions: self.actions().to_vec(),
            selection: self.selection(),
        }
    }
}

pub trait UndoStack {
    /// Records the current track state under `tag`.
    fn snapshot(&mut self, tag: UndoTag);

    /// Restores and pops the most recent snapshot. Returns `false` when the
    /// history is empty.
    fn undo(&mut self) -> bool;

    fn match_top(&self, tag: UndoTag) -> bool;
}

/// A track together with its own undo history.
pub trait TrackDocument: ActionTrack + UndoStack {}

impl<T: ActionTrack + UndoStack + ?Sized> TrackDocument for T {}

pub trait Clock {
    fn current_position_ms(&self) -> f64;
    fn frame_time_ms(&self) -> f64;
    fn set_position(&mut self, position_ms: f64);
}

/// Everything a tool needs from the editor that owns the loaded tracks.
pub trait EditorHost {
    fn active_track_index(&self) -> usize;
    fn track(&self, index: usize) -> Option<&dyn TrackDocument>;
    fn track_mut(&mut self, index: usize) -> Option<&mut dyn TrackDocument>;
    fn clipboard(&self) -> &[Action];
    fn clock(&self) -> &dyn Clock;
    fn clock_mut(&mut self) -> &mut dyn Clock;

    fn active_track_mut(&mut self) -> Option<&mut dyn TrackDocument> {
        let index = self.active_track_index();
        self.track_mut(index)
    }
}
