//! Build error type.

use hb_toc::TocError;

use crate::step::{BuildStep, ExecutionBehavior};

/// Error type for composition builds.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// TOC loading, composition or saving failed.
    #[error(transparent)]
    Toc(#[from] TocError),

    /// The build was cancelled before the step started.
    #[error("Build cancelled before step {0}")]
    Cancelled(BuildStep),

    /// An extension failed.
    #[error("Plug-in '{name}' failed {behavior} step {step}: {source}")]
    PlugIn {
        /// Plug-in name.
        name: String,
        /// Step being executed.
        step: BuildStep,
        /// Execution slot.
        behavior: ExecutionBehavior,
        /// Error reported by the plug-in.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Build state (de)serialization failed.
    #[error("Build state error: {0}")]
    State(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Diagnostic code for fatal configuration errors.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Toc(err) => err.code(),
            _ => None,
        }
    }

    /// True if the build stopped because it was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
