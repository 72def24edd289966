//! track-transform: editing tools for timestamped motion tracks.
//!
//! Three interchangeable tools operate on a host-owned track: a range
//! extender, a Ramer-Douglas-Peucker simplifier and a sandboxed scripted
//! transform that runs on a worker thread and hands its result back to the
//! owning thread as a single undoable edit.

pub mod api;
pub mod core;
pub mod error;
pub mod host;
pub mod script;
pub mod telemetry;

pub use api::{EditorConfig, ToolKind, TransformToolRegistry};
pub use error::{TransformError, TransformResult};
