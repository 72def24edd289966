use std::path::PathBuf;

use thiserror::Error;

pub type TransformResult<T> = Result<T, TransformError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The sandbox failed to initialize or the setup payload did not run.
    #[error("script environment fault: {0}")]
    EnvironmentFault(String),

    /// The user script raised an error while executing.
    #[error("script execution fault: {0}")]
    ScriptExecutionFault(String),

    /// The script ran but left state that does not satisfy the result contract.
    #[error("malformed script result: {0}")]
    MalformedResult(String),

    #[error("target track {index} no longer exists")]
    InvalidTarget { index: usize },

    #[error("selection too small: {actual} selected, at least {required} required")]
    SelectionTooSmall { required: usize, actual: usize },

    #[error("no script named `{name}`")]
    UnknownScript { name: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("i/o error at `{}`: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl TransformError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns `true` for faults raised on the worker side of a script job.
    #[must_use]
    pub fn is_job_fault(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentFault(_) | Self::ScriptExecutionFault(_) | Self::MalformedResult(_)
        )
    }
}
