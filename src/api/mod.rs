mod coalescing;
mod config;
mod registry;
mod tools;

pub use coalescing::CoalescingEditSession;
pub use config::{EDITOR_CONFIG_JSON_SCHEMA_V1, EditorConfig};
pub use registry::{ToolEvent, ToolKind, TransformTool, TransformToolRegistry};
pub use tools::{RangeExtenderTool, ScriptedTransformTool, SimplifyTool};
