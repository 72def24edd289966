use crate::core::{Action, POSITION_MAX, POSITION_MIN};

pub const RANGE_EXTEND_MIN: i32 = -50;
pub const RANGE_EXTEND_MAX: i32 = 100;

/// Stretches the interior of one run of consecutive actions.
///
/// Every interior action moves away from the mean of itself and its two
/// neighbors by `delta / 50` times its deviation from that mean. `delta` is
/// clamped to `[-50, 100]`: `0` is the identity and `-50` flattens interior
/// points onto their local mean. The first and last action never move and
/// results are clamped to the valid position range.
#[must_use]
pub fn extend_run(run: &[Action], delta: i32) -> Vec<Action> {
    let delta = delta.clamp(RANGE_EXTEND_MIN, RANGE_EXTEND_MAX);
    if delta == 0 || run.len() < 3 {
        return run.to_vec();
    }

    let factor = f64::from(delta) / 50.0;
    let mut out = run.to_vec();
    for (index, window) in run.windows(3).enumerate() {
        let (prev, current, next) = (window[0].pos, window[1].pos, window[2].pos);
        let mean = f64::from(prev + current + next) / 3.0;
        let deviation = f64::from(current) - mean;
        let stretched = (f64::from(current) + deviation * factor).round() as i32;
        out[index + 1] = window[1].with_pos(stretched.clamp(POSITION_MIN, POSITION_MAX));
    }
    out
}

/// Applies [`extend_run`] to every run of track-adjacent selected actions.
///
/// Returns the selected actions in track order with their new positions.
#[must_use]
pub fn extend_selection(
    track: &[Action],
    is_selected: impl Fn(Action) -> bool,
    delta: i32,
) -> Vec<Action> {
    let mut extended = Vec::new();
    let mut run = Vec::new();
    for action in track.iter().copied() {
        if is_selected(action) {
            run.push(action);
        } else if !run.is_empty() {
            extended.extend(extend_run(&run, delta));
            run.clear();
        }
    }
    if !run.is_empty() {
        extended.extend(extend_run(&run, delta));
    }
    extended
}
