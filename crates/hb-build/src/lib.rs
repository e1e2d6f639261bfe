//! TOC composition build steps for HB.
//!
//! [`Composer`] runs the composition steps over a working directory holding
//! the intermediate TOC files, threading a [`CompositionContext`] through
//! them. Each step can be extended or replaced by [`PlugIn`]s, reports to a
//! [`ProgressSink`] and stops early when its [`CancellationToken`] is
//! cancelled.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use hb_build::{Composer, CompositionContext};
//! use hb_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let mut composer = Composer::new(CompositionContext::from_config(&config));
//! let state = composer.run()?;
//! println!("default topic: {:?}", state.default_topic);
//! # Ok(())
//! # }
//! ```

mod cancel;
mod composer;
mod context;
mod error;
mod plugin;
mod progress;
mod step;
mod warnings;

pub use cancel::CancellationToken;
pub use composer::Composer;
pub use context::{BuildState, CompositionContext};
pub use error::BuildError;
pub use plugin::{ExecutionPoint, PlugIn, PlugInError, PlugInRegistry};
pub use progress::{ProgressSink, TracingProgress};
pub use step::{BuildStep, ExecutionBehavior};
pub use warnings::{
    BuildWarning, DUPLICATE_TOC_ID_CODE, HELP1_FILE_NAME_CODE, breaks_help1_compiler,
    duplicate_id_warnings, is_problem_file_name, scan_help1_output,
};
