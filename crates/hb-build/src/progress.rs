//! Build progress reporting.

use std::fmt;

use crate::step::BuildStep;

/// Receives progress messages from the composer.
///
/// `step` is set when a new build step starts and `None` for messages within
/// the current step.
pub trait ProgressSink: Send {
    fn report(&mut self, step: Option<BuildStep>, message: fmt::Arguments<'_>);
}

/// Progress sink forwarding messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&mut self, step: Option<BuildStep>, message: fmt::Arguments<'_>) {
        match step {
            Some(step) => tracing::info!(%step, "{message}"),
            None => tracing::info!("{message}"),
        }
    }
}
