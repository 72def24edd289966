use std::collections::HashSet;
use std::fmt::Write as _;

use rhai::{Array, Dynamic, Map};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{Action, PlaybackTiming, TrackSnapshot};
use crate::error::{TransformError, TransformResult};

use super::sandbox::{
    ACTIONS_FIELD, CLIPBOARD, CURRENT_SCRIPT, CURRENT_TIME_MS, FRAME_TIME_MS, Sandbox,
};

/// Generated setup code, consumed once by the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupPayload(String);

impl SetupPayload {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

/// Everything read back from a finished sandbox.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScriptResult {
    /// Records in the order the script left them.
    pub points: Vec<Action>,
    /// Subset of `points` flagged selected.
    pub selection: Vec<Action>,
    /// New playback position requested by the script.
    pub cursor_ms: f64,
}

/// Renders the track, clipboard and timing into sandbox setup code.
///
/// Track actions carry their selection flag; clipboard actions are never
/// selected. Timing values are rendered with six decimals.
#[must_use]
pub fn build_setup_payload(
    snapshot: &TrackSnapshot,
    clipboard: &[Action],
    timing: PlaybackTiming,
) -> SetupPayload {
    let mut source = String::with_capacity((snapshot.actions.len() + clipboard.len()) * 40 + 64);
    let selected: HashSet<i32> = snapshot.selection.iter().map(|action| action.at).collect();

    for action in &snapshot.actions {
        let _ = writeln!(
            source,
            "{CURRENT_SCRIPT}.add_action({}, {}, {});",
            action.at,
            action.pos,
            selected.contains(&action.at)
        );
    }
    for action in clipboard {
        let _ = writeln!(
            source,
            "{CLIPBOARD}.add_action({}, {}, false);",
            action.at, action.pos
        );
    }
    let _ = writeln!(
        source,
        "{CURRENT_TIME_MS} = {};",
        float_literal(timing.current_position_ms, CURRENT_TIME_MS)
    );
    let _ = writeln!(
        source,
        "{FRAME_TIME_MS} = {};",
        float_literal(timing.frame_time_ms, FRAME_TIME_MS)
    );

    SetupPayload(source)
}

fn float_literal(value: f64, name: &str) -> String {
    if value.is_finite() {
        format!("{value:.6}")
    } else {
        warn!(name, value, "non-finite timing value replaced with 0");
        "0.0".to_owned()
    }
}

/// Reads the script's action list and cursor back out of the sandbox.
///
/// Every record must be an object map with numeric `at`, numeric `pos` and
/// boolean `selected`; one bad record fails the whole extraction.
pub fn extract_result(sandbox: &Sandbox) -> TransformResult<ScriptResult> {
    let scope = sandbox.scope();

    let script = scope.get_value::<Map>(CURRENT_SCRIPT).ok_or_else(|| {
        malformed(format!("`{CURRENT_SCRIPT}` is missing or not an object map"))
    })?;
    let actions = script
        .get(ACTIONS_FIELD)
        .ok_or_else(|| malformed(format!("`{CURRENT_SCRIPT}.{ACTIONS_FIELD}` is missing")))?;
    let records = actions.clone().try_cast::<Array>().ok_or_else(|| {
        malformed(format!(
            "`{CURRENT_SCRIPT}.{ACTIONS_FIELD}` is `{}`, expected an array",
            actions.type_name()
        ))
    })?;

    let mut result = ScriptResult {
        points: Vec::with_capacity(records.len()),
        ..ScriptResult::default()
    };
    for (index, record) in records.into_iter().enumerate() {
        let (action, selected) = read_record(index, record)?;
        result.points.push(action);
        if selected {
            result.selection.push(action);
        }
    }

    let cursor = scope
        .get(CURRENT_TIME_MS)
        .ok_or_else(|| malformed(format!("`{CURRENT_TIME_MS}` is missing")))?;
    result.cursor_ms = read_number(cursor)
        .filter(|cursor| cursor.is_finite())
        .ok_or_else(|| malformed(format!("`{CURRENT_TIME_MS}` is not a finite number")))?;

    Ok(result)
}

fn read_record(index: usize, record: Dynamic) -> TransformResult<(Action, bool)> {
    let type_name = record.type_name();
    let record = record
        .try_cast::<Map>()
        .ok_or_else(|| malformed(format!("action #{index} is `{type_name}`, expected a map")))?;

    let at = record
        .get("at")
        .and_then(read_coordinate)
        .ok_or_else(|| malformed(format!("action #{index}: couldn't read `at` timestamp")))?;
    let pos = record
        .get("pos")
        .and_then(read_coordinate)
        .ok_or_else(|| malformed(format!("action #{index}: couldn't read `pos` position")))?;
    let selected = record
        .get("selected")
        .and_then(|value| value.as_bool().ok())
        .ok_or_else(|| malformed(format!("action #{index}: couldn't read `selected` flag")))?;

    Ok((Action::new(at, pos), selected))
}

/// Integer, or finite float truncated toward zero, that fits in `i32`.
///
/// Domain checks (negative timestamps, position clamping) are left to the
/// host's insert path.
fn read_coordinate(value: &Dynamic) -> Option<i32> {
    if let Ok(int) = value.as_int() {
        return i32::try_from(int).ok();
    }
    let float = value.as_float().ok()?.trunc();
    let in_range = float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX);
    // NaN fails both comparisons
    in_range.then(|| float as i32)
}

fn read_number(value: &Dynamic) -> Option<f64> {
    value
        .as_int()
        .map(|int| int as f64)
        .ok()
        .or_else(|| value.as_float().ok())
}

fn malformed(message: String) -> TransformError {
    TransformError::MalformedResult(message)
}
