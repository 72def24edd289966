pub mod range_extend;
pub mod simplify;
pub mod types;

pub use range_extend::{RANGE_EXTEND_MAX, RANGE_EXTEND_MIN, extend_run, extend_selection};
pub use simplify::{perpendicular_distance, simplify};
pub use types::{Action, POSITION_MAX, POSITION_MIN, PlaybackTiming, TrackSnapshot};
