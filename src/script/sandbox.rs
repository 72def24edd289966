use std::path::{Path, PathBuf};

use rhai::{AST, Array, Dynamic, Engine, EvalAltResult, Map, Scope};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{TransformError, TransformResult};

pub const CURRENT_SCRIPT: &str = "CurrentScript";
pub const CLIPBOARD: &str = "Clipboard";
pub const CURRENT_TIME_MS: &str = "CurrentTimeMs";
pub const FRAME_TIME_MS: &str = "FrameTimeMs";
pub const ACTIONS_FIELD: &str = "actions";

/// Resource limits applied to every sandbox engine.
///
/// Size limits of `0` mean unlimited. Scripts are not cancellable, so the
/// operation limit is the only guard against a looping script; `None` lifts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxLimits {
    #[serde(default = "default_max_operations")]
    pub max_operations: Option<u64>,
    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,
    #[serde(default = "default_max_expr_depth")]
    pub max_expr_depth: usize,
    #[serde(default)]
    pub max_string_size: usize,
    #[serde(default)]
    pub max_array_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: default_max_operations(),
            max_call_levels: default_max_call_levels(),
            max_expr_depth: default_max_expr_depth(),
            max_string_size: 0,
            max_array_size: 0,
        }
    }
}

fn default_max_operations() -> Option<u64> {
    Some(50_000_000)
}

fn default_max_call_levels() -> usize {
    64
}

fn default_max_expr_depth() -> usize {
    64
}

/// One isolated script engine and its global scope.
///
/// A sandbox is built fresh for every run and owned by exactly one job. The
/// scope starts with empty `CurrentScript` and `Clipboard` object maps and
/// zeroed timing variables; the setup payload fills them in. Nothing user
/// supplied runs until the job executes on its worker.
pub struct Sandbox {
    engine: Engine,
    scope: Scope<'static>,
    prelude: Option<AST>,
}

impl Sandbox {
    /// Builds the engine and a scope holding empty track and clipboard lists.
    #[must_use]
    pub fn new(limits: &SandboxLimits) -> Self {
        let engine = create_engine(limits);

        let mut scope = Scope::new();
        scope.push(CURRENT_SCRIPT, empty_action_list());
        scope.push(CLIPBOARD, empty_action_list());
        scope.push(CURRENT_TIME_MS, 0.0 as rhai::FLOAT);
        scope.push(FRAME_TIME_MS, 0.0 as rhai::FLOAT);

        Self {
            engine,
            scope,
            prelude: None,
        }
    }

    /// Compiles and runs the prelude script, keeping its functions for the
    /// user script. Runs under the same limits as the script itself.
    pub fn load_prelude(&mut self, path: &Path) -> TransformResult<()> {
        let ast = self
            .engine
            .compile_file(path.to_path_buf())
            .map_err(|err| TransformError::EnvironmentFault(describe(&err)))?;
        self.engine
            .run_ast_with_scope(&mut self.scope, &ast)
            .map_err(|err| TransformError::EnvironmentFault(describe(&err)))?;
        debug!(path = %path.display(), "prelude loaded");
        self.prelude = Some(ast.clone_functions_only());
        Ok(())
    }

    /// Runs generated setup code against the scope.
    pub fn run_setup(&mut self, source: &str) -> TransformResult<()> {
        self.engine
            .run_with_scope(&mut self.scope, source)
            .map_err(|err| TransformError::EnvironmentFault(describe(&err)))
    }

    /// Compiles and runs a user script file. Functions defined by the prelude
    /// are visible to the script.
    pub fn run_script_file(&mut self, path: &Path) -> TransformResult<()> {
        let ast = self
            .engine
            .compile_file(PathBuf::from(path))
            .map_err(|err| TransformError::ScriptExecutionFault(describe(&err)))?;
        let ast = match &self.prelude {
            Some(prelude) => prelude.merge(&ast),
            None => ast,
        };
        self.engine
            .run_ast_with_scope(&mut self.scope, &ast)
            .map_err(|err| TransformError::ScriptExecutionFault(describe(&err)))
    }

    /// Runs inline script source, as if it were a script file.
    pub fn run_script_source(&mut self, source: &str) -> TransformResult<()> {
        self.engine
            .run_with_scope(&mut self.scope, source)
            .map_err(|err| TransformError::ScriptExecutionFault(describe(&err)))
    }

    #[must_use]
    pub fn scope(&self) -> &Scope<'static> {
        &self.scope
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("variables", &self.scope.len())
            .field("prelude", &self.prelude.is_some())
            .finish()
    }
}

fn create_engine(limits: &SandboxLimits) -> Engine {
    let mut engine = Engine::new();

    if let Some(max_operations) = limits.max_operations {
        engine.set_max_operations(max_operations);
    }
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);

    engine.on_print(|text| info!(target: "track_transform::script", "{text}"));
    engine.on_debug(|text, source, position| {
        debug!(
            target: "track_transform::script",
            source = source.unwrap_or("<script>"),
            %position,
            "{text}"
        );
    });

    engine.register_fn("add_action", add_action);
    engine
}

fn empty_action_list() -> Map {
    let mut list = Map::new();
    list.insert(ACTIONS_FIELD.into(), Dynamic::from_array(Array::new()));
    list
}

/// `list.add_action(at, pos, selected)`: appends one action record.
fn add_action(list: &mut Map, at: rhai::INT, pos: rhai::INT, selected: bool) {
    let mut record = Map::new();
    record.insert("at".into(), Dynamic::from_int(at));
    record.insert("pos".into(), Dynamic::from_int(pos));
    record.insert("selected".into(), Dynamic::from_bool(selected));

    let mut actions = list
        .remove(ACTIONS_FIELD)
        .and_then(|value| value.try_cast::<Array>())
        .unwrap_or_default();
    actions.push(Dynamic::from_map(record));
    list.insert(ACTIONS_FIELD.into(), Dynamic::from_array(actions));
}

// engine messages already carry line/position
fn describe(err: &EvalAltResult) -> String {
    err.to_string()
}
