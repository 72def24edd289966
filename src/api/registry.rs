use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::host::EditorHost;
use crate::script::JobOutcome;

use super::{EditorConfig, RangeExtenderTool, ScriptedTransformTool, SimplifyTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    RangeExtender,
    Simplify,
    CustomScript,
}

/// Host notifications forwarded to the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolEvent {
    SelectionChanged { selection_size: usize },
}

#[derive(Debug)]
pub enum TransformTool {
    RangeExtender(RangeExtenderTool),
    Simplify(SimplifyTool),
    CustomScript(ScriptedTransformTool),
}

impl TransformTool {
    fn build(kind: ToolKind, config: &EditorConfig) -> Self {
        match kind {
            ToolKind::RangeExtender => {
                Self::RangeExtender(RangeExtenderTool::new(config.min_selection))
            }
            ToolKind::Simplify => Self::Simplify(SimplifyTool::new(config.min_selection)),
            ToolKind::CustomScript => Self::CustomScript(ScriptedTransformTool::new(config)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::RangeExtender(_) => ToolKind::RangeExtender,
            Self::Simplify(_) => ToolKind::Simplify,
            Self::CustomScript(_) => ToolKind::CustomScript,
        }
    }

    pub fn on_event(&mut self, event: ToolEvent) {
        match (self, event) {
            (Self::RangeExtender(tool), ToolEvent::SelectionChanged { selection_size }) => {
                tool.on_selection_changed(selection_size);
            }
            (Self::Simplify(tool), ToolEvent::SelectionChanged { selection_size }) => {
                tool.on_selection_changed(selection_size);
            }
            (Self::CustomScript(_), ToolEvent::SelectionChanged { .. }) => {}
        }
    }
}

/// Holds exactly one active transform tool.
///
/// Switching tools builds a fresh instance, so parameters and coalescing
/// state never carry over.
#[derive(Debug)]
pub struct TransformToolRegistry {
    config: EditorConfig,
    active: TransformTool,
}

impl TransformToolRegistry {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let active = TransformTool::build(config.active_tool, &config);
        Self { config, active }
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn active_kind(&self) -> ToolKind {
        self.active.kind()
    }

    /// Switches the active tool. Refused while a script job is in flight.
    pub fn set_active(&mut self, kind: ToolKind) -> bool {
        if let TransformTool::CustomScript(tool) = &self.active {
            if tool.is_running() {
                warn!(requested = ?kind, "cannot switch tools while a script is running");
                return false;
            }
        }
        debug!(from = ?self.active.kind(), to = ?kind, "switch transform tool");
        self.active = TransformTool::build(kind, &self.config);
        self.config.active_tool = kind;
        true
    }

    #[must_use]
    pub fn active(&self) -> &TransformTool {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut TransformTool {
        &mut self.active
    }

    pub fn on_event(&mut self, event: ToolEvent) {
        self.active.on_event(event);
    }

    /// Delivers pending script completions. Call once per host event turn.
    pub fn process_events(&mut self, host: &mut dyn EditorHost) -> Option<JobOutcome> {
        match &mut self.active {
            TransformTool::CustomScript(tool) => tool.process_events(host),
            _ => None,
        }
    }

    pub fn range_extender_mut(&mut self) -> Option<&mut RangeExtenderTool> {
        match &mut self.active {
            TransformTool::RangeExtender(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn simplify_mut(&mut self) -> Option<&mut SimplifyTool> {
        match &mut self.active {
            TransformTool::Simplify(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn scripted_mut(&mut self) -> Option<&mut ScriptedTransformTool> {
        match &mut self.active {
            TransformTool::CustomScript(tool) => Some(tool),
            _ => None,
        }
    }
}
