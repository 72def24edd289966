use std::collections::BTreeSet;

use tracing::{trace, warn};

use crate::core::{Action, POSITION_MAX, POSITION_MIN};

use super::{ActionTrack, Clock, EditorHost, TrackDocument, UndoStack, UndoTag};

#[derive(Debug, Clone, PartialEq, Eq)]
struct UndoEntry {
    tag: UndoTag,
    actions: Vec<Action>,
    selection: BTreeSet<i32>,
}

/// In-memory track used by headless hosts and tests.
///
/// Selection is keyed by timestamp so edits that rebuild the action list keep
/// selections stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTrack {
    actions: Vec<Action>,
    selection: BTreeSet<i32>,
    history: Vec<UndoEntry>,
}

impl MemoryTrack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a track through the validating insert path.
    #[must_use]
    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut track = Self::new();
        for action in actions {
            track.add_action(action);
        }
        track
    }

    /// Number of entries on the undo history.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn undo_tags(&self) -> Vec<UndoTag> {
        self.history.iter().map(|entry| entry.tag).collect()
    }

    fn index_of(&self, at: i32) -> Result<usize, usize> {
        self.actions.binary_search_by_key(&at, |action| action.at)
    }
}

impl ActionTrack for MemoryTrack {
    fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn add_action(&mut self, action: Action) -> bool {
        if action.at < 0 {
            warn!(at = action.at, "rejecting action with negative timestamp");
            return false;
        }
        let action = action.with_pos(action.pos.clamp(POSITION_MIN, POSITION_MAX));
        match self.index_of(action.at) {
            Ok(index) => {
                trace!(at = action.at, "replacing action with duplicate timestamp");
                self.actions[index] = action;
            }
            Err(index) => self.actions.insert(index, action),
        }
        true
    }

    fn remove_selected(&mut self) {
        let selection = std::mem::take(&mut self.selection);
        self.actions.retain(|action| !selection.contains(&action.at));
    }

    fn select_all(&mut self) {
        self.selection = self.actions.iter().map(|action| action.at).collect();
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn set_selection(&mut self, action: Action, selected: bool) {
        if self.index_of(action.at).is_err() {
            return;
        }
        if selected {
            self.selection.insert(action.at);
        } else {
            self.selection.remove(&action.at);
        }
    }

    fn is_selected(&self, action: Action) -> bool {
        self.selection.contains(&action.at)
    }

    fn selection_size(&self) -> usize {
        self.selection.len()
    }
}

impl UndoStack for MemoryTrack {
    fn snapshot(&mut self, tag: UndoTag) {
        self.history.push(UndoEntry {
            tag,
            actions: self.actions.clone(),
            selection: self.selection.clone(),
        });
    }

    fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(entry) => {
                self.actions = entry.actions;
                self.selection = entry.selection;
                true
            }
            None => false,
        }
    }

    fn match_top(&self, tag: UndoTag) -> bool {
        self.history.last().is_some_and(|entry| entry.tag == tag)
    }
}

/// Player clock whose position only moves when told to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualClock {
    pub position_ms: f64,
    pub frame_time_ms: f64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            position_ms: 0.0,
            frame_time_ms: 1000.0 / 60.0,
        }
    }
}

impl Clock for ManualClock {
    fn current_position_ms(&self) -> f64 {
        self.position_ms
    }

    fn frame_time_ms(&self) -> f64 {
        self.frame_time_ms
    }

    fn set_position(&mut self, position_ms: f64) {
        self.position_ms = position_ms;
    }
}

/// A set of loaded tracks plus clipboard and clock.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    pub tracks: Vec<MemoryTrack>,
    pub active: usize,
    pub clipboard: Vec<Action>,
    pub clock: ManualClock,
}

impl MemoryWorkspace {
    #[must_use]
    pub fn with_track(track: MemoryTrack) -> Self {
        Self {
            tracks: vec![track],
            ..Self::default()
        }
    }

    /// Closes a loaded track; later indices shift down.
    pub fn close_track(&mut self, index: usize) -> Option<MemoryTrack> {
        (index < self.tracks.len()).then(|| self.tracks.remove(index))
    }
}

impl EditorHost for MemoryWorkspace {
    fn active_track_index(&self) -> usize {
        self.active
    }

    fn track(&self, index: usize) -> Option<&dyn TrackDocument> {
        self.tracks
            .get(index)
            .map(|track| track as &dyn TrackDocument)
    }

    fn track_mut(&mut self, index: usize) -> Option<&mut dyn TrackDocument> {
        self.tracks
            .get_mut(index)
            .map(|track| track as &mut dyn TrackDocument)
    }

    fn clipboard(&self) -> &[Action] {
        &self.clipboard
    }

    fn clock(&self) -> &dyn Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut dyn Clock {
        &mut self.clock
    }
}
