use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, error, trace};

use crate::core::{RANGE_EXTEND_MAX, RANGE_EXTEND_MIN, extend_selection, simplify};
use crate::error::{TransformError, TransformResult};
use crate::host::{EditorHost, TrackDocument, UndoTag};
use crate::script::{JobOutcome, ScriptEntry, ScriptJobRunner, discover_scripts};

use super::{CoalescingEditSession, EditorConfig};

fn ensure_editable(
    document: &dyn TrackDocument,
    tag: UndoTag,
    min_selection: usize,
) -> TransformResult<()> {
    let actual = document.selection_size();
    // a gesture in progress may have emptied the selection itself
    if actual >= min_selection || document.match_top(tag) {
        return Ok(());
    }
    Err(TransformError::SelectionTooSmall {
        required: min_selection,
        actual,
    })
}

/// Stretches selected actions away from their local neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeExtenderTool {
    session: CoalescingEditSession,
    range: i32,
    min_selection: usize,
}

impl RangeExtenderTool {
    #[must_use]
    pub fn new(min_selection: usize) -> Self {
        Self {
            session: CoalescingEditSession::new(UndoTag::RangeExtend),
            range: 0,
            min_selection,
        }
    }

    #[must_use]
    pub fn range(&self) -> i32 {
        self.range
    }

    /// Ignores empty selections, which the tool's own edits produce.
    pub fn on_selection_changed(&mut self, selection_size: usize) {
        if selection_size > 0 {
            self.range = 0;
            self.session.on_selection_changed();
        }
    }

    #[must_use]
    pub fn can_edit(&self, document: &dyn TrackDocument) -> bool {
        ensure_editable(document, UndoTag::RangeExtend, self.min_selection).is_ok()
    }

    /// One slider tick. `range` is clamped to `[-50, 100]` and always applies
    /// relative to the state before the gesture.
    pub fn set_range(
        &mut self,
        document: &mut dyn TrackDocument,
        range: i32,
    ) -> TransformResult<()> {
        ensure_editable(document, UndoTag::RangeExtend, self.min_selection)?;
        self.range = range.clamp(RANGE_EXTEND_MIN, RANGE_EXTEND_MAX);
        let range = self.range;
        self.session.on_parameter_edited(document, |document| {
            let extended = extend_selection(
                document.actions(),
                |action| document.is_selected(action),
                range,
            );
            trace!(range, count = extended.len(), "range extend");
            document.remove_selected();
            for action in extended {
                document.add_action(action);
                document.set_selection(action, true);
            }
        });
        Ok(())
    }
}

/// Ramer-Douglas-Peucker simplification of the selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyTool {
    session: CoalescingEditSession,
    epsilon: f64,
    min_selection: usize,
}

impl SimplifyTool {
    #[must_use]
    pub fn new(min_selection: usize) -> Self {
        Self {
            session: CoalescingEditSession::new(UndoTag::Simplify),
            epsilon: 0.0,
            min_selection,
        }
    }

    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn on_selection_changed(&mut self, selection_size: usize) {
        if selection_size > 0 {
            self.epsilon = 0.0;
            self.session.on_selection_changed();
        }
    }

    #[must_use]
    pub fn can_edit(&self, document: &dyn TrackDocument) -> bool {
        ensure_editable(document, UndoTag::Simplify, self.min_selection).is_ok()
    }

    /// One drag tick. Negative and NaN epsilons are treated as `0`.
    ///
    /// The selected actions are replaced by their simplified subsequence,
    /// which is left unselected.
    pub fn set_epsilon(
        &mut self,
        document: &mut dyn TrackDocument,
        epsilon: f64,
    ) -> TransformResult<()> {
        ensure_editable(document, UndoTag::Simplify, self.min_selection)?;
        self.epsilon = epsilon.max(0.0);
        let epsilon = self.epsilon;
        self.session.on_parameter_edited(document, |document| {
            let selection = document.selection();
            document.remove_selected();
            let simplified = simplify(&selection, epsilon);
            trace!(
                epsilon,
                before = selection.len(),
                after = simplified.len(),
                "simplify"
            );
            for action in simplified {
                document.add_action(action);
            }
        });
        Ok(())
    }
}

/// Runs user scripts from the configured script directory.
#[derive(Debug)]
pub struct ScriptedTransformTool {
    runner: ScriptJobRunner,
    script_dir: PathBuf,
    script_extension: String,
    prelude_file: Option<String>,
    scripts: IndexMap<String, ScriptEntry>,
}

impl ScriptedTransformTool {
    /// Builds the tool and performs an initial script scan. A failed scan is
    /// logged and leaves the list empty.
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        let mut tool = Self {
            runner: ScriptJobRunner::new(config.sandbox, config.prelude_path()),
            script_dir: config.script_dir.clone(),
            script_extension: config.script_extension.clone(),
            prelude_file: config.prelude_file.clone(),
            scripts: IndexMap::new(),
        };
        if let Err(err) = tool.reload_scripts() {
            error!(error = %err, "failed to scan script directory");
        }
        tool
    }

    /// Rescans the script directory. Returns the number of scripts found.
    pub fn reload_scripts(&mut self) -> TransformResult<usize> {
        let found = discover_scripts(
            &self.script_dir,
            &self.script_extension,
            self.prelude_file.as_deref(),
        )?;
        self.scripts = found
            .into_iter()
            .map(|entry| (entry.display_name.clone(), entry))
            .collect();
        Ok(self.scripts.len())
    }

    #[must_use]
    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn scripts(&self) -> impl Iterator<Item = &ScriptEntry> {
        self.scripts.values()
    }

    /// Run controls should be disabled while this is `true`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    #[must_use]
    pub fn runner(&self) -> &ScriptJobRunner {
        &self.runner
    }

    /// Runs a discovered script by display name.
    pub fn run_script(&mut self, host: &dyn EditorHost, name: &str) -> TransformResult<bool> {
        let path = self
            .scripts
            .get(name)
            .map(|entry| entry.path.clone())
            .ok_or_else(|| TransformError::UnknownScript {
                name: name.to_owned(),
            })?;
        debug!(name, "run script");
        self.runner.run(host, path)
    }

    pub fn run_path(
        &mut self,
        host: &dyn EditorHost,
        path: impl Into<PathBuf>,
    ) -> TransformResult<bool> {
        self.runner.run(host, path)
    }

    pub fn process_events(&mut self, host: &mut dyn EditorHost) -> Option<JobOutcome> {
        self.runner.process_events(host)
    }

    pub fn wait_for_completion(
        &mut self,
        host: &mut dyn EditorHost,
        timeout: Duration,
    ) -> Option<JobOutcome> {
        self.runner.wait_for_completion(host, timeout)
    }
}
