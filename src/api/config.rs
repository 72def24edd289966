use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::script::SandboxLimits;

use super::ToolKind;

pub const EDITOR_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Settings shared by the transform tools.
///
/// Serializable so hosts can persist the chosen tool and script location next
/// to their own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,
    /// Script file extension, without the leading dot.
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
    /// File inside `script_dir` loaded into every sandbox before the script.
    #[serde(default = "default_prelude_file")]
    pub prelude_file: Option<String>,
    /// Selected actions required before range/simplify edits are accepted.
    #[serde(default = "default_min_selection")]
    pub min_selection: usize,
    #[serde(default)]
    pub active_tool: ToolKind,
    #[serde(default)]
    pub sandbox: SandboxLimits,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new(default_script_dir())
    }
}

impl EditorConfig {
    #[must_use]
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
            script_extension: default_script_extension(),
            prelude_file: default_prelude_file(),
            min_selection: default_min_selection(),
            active_tool: ToolKind::default(),
            sandbox: SandboxLimits::default(),
        }
    }

    #[must_use]
    pub fn with_active_tool(mut self, tool: ToolKind) -> Self {
        self.active_tool = tool;
        self
    }

    #[must_use]
    pub fn with_prelude_file(mut self, prelude_file: Option<String>) -> Self {
        self.prelude_file = prelude_file;
        self
    }

    #[must_use]
    pub fn with_sandbox_limits(mut self, limits: SandboxLimits) -> Self {
        self.sandbox = limits;
        self
    }

    #[must_use]
    pub fn prelude_path(&self) -> Option<PathBuf> {
        self.prelude_file
            .as_deref()
            .map(|file| self.script_dir.join(file))
    }

    #[must_use]
    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn validate(&self) -> TransformResult<()> {
        if self.script_extension.is_empty() || self.script_extension.starts_with('.') {
            return Err(TransformError::InvalidConfig(format!(
                "script extension must be non-empty and given without a dot, got `{}`",
                self.script_extension
            )));
        }
        if self.min_selection < 2 {
            return Err(TransformError::InvalidConfig(format!(
                "min_selection must be at least 2, got {}",
                self.min_selection
            )));
        }
        if let Some(prelude) = &self.prelude_file {
            if prelude.is_empty() || prelude.contains(['/', '\\']) {
                return Err(TransformError::InvalidConfig(format!(
                    "prelude file must be a bare file name, got `{prelude}`"
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> TransformResult<String> {
        let payload = EditorConfigJsonContractV1 {
            schema_version: EDITOR_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            TransformError::InvalidConfig(format!("failed to serialize editor config: {e}"))
        })
    }

    /// Parses either a bare config object or a versioned contract payload.
    pub fn from_json_str(input: &str) -> TransformResult<Self> {
        let config = match serde_json::from_str::<EditorConfigJsonContractV1>(input) {
            Ok(payload) => {
                if payload.schema_version != EDITOR_CONFIG_JSON_SCHEMA_V1 {
                    return Err(TransformError::InvalidConfig(format!(
                        "unsupported editor config schema version: {}",
                        payload.schema_version
                    )));
                }
                payload.config
            }
            Err(_) => serde_json::from_str::<EditorConfig>(input).map_err(|e| {
                TransformError::InvalidConfig(format!("failed to parse editor config: {e}"))
            })?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EditorConfigJsonContractV1 {
    schema_version: u32,
    config: EditorConfig,
}

fn default_script_dir() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_script_extension() -> String {
    "rhai".to_owned()
}

fn default_prelude_file() -> Option<String> {
    Some("prelude.rhai".to_owned())
}

fn default_min_selection() -> usize {
    5
}
