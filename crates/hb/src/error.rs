//! CLI error types.

use hb_build::BuildError;
use hb_config::ConfigError;
use hb_toc::TocError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Toc(#[from] TocError),
}
