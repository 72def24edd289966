//! Sandboxed scripted transforms.
//!
//! A run copies the active track into a fresh Rhai sandbox as generated setup
//! code, executes the user's script on a worker thread and copies the result
//! back out. Nothing crosses the thread boundary by reference.

pub mod discovery;
pub mod job;
pub mod marshal;
pub mod sandbox;

pub use discovery::{ScriptEntry, discover_scripts};
pub use job::{JobOutcome, JobState, ScriptJobRunner, WORKER_THREAD_NAME};
pub use marshal::{ScriptResult, SetupPayload, build_setup_payload, extract_result};
pub use sandbox::{Sandbox, SandboxLimits};
