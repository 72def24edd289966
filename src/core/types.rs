use serde::{Deserialize, Serialize};

pub const POSITION_MIN: i32 = 0;
pub const POSITION_MAX: i32 = 100;

/// One `(timestamp, position)` point on a motion track.
///
/// Ordering is by timestamp first, which is also the track order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Action {
    /// Timestamp in milliseconds.
    pub at: i32,
    /// Position in `[0, 100]`.
    pub pos: i32,
}

impl Action {
    #[must_use]
    pub fn new(at: i32, pos: i32) -> Self {
        Self { at, pos }
    }

    #[must_use]
    pub fn with_pos(self, pos: i32) -> Self {
        Self { at: self.at, pos }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.at >= 0 && (POSITION_MIN..=POSITION_MAX).contains(&self.pos)
    }
}

/// Owned copy of a track taken at job start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub actions: Vec<Action>,
    /// Selected subset, matched against `actions` by timestamp.
    pub selection: Vec<Action>,
}

/// Player timing values exposed to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackTiming {
    pub current_position_ms: f64,
    pub frame_time_ms: f64,
}
