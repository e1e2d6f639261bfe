//! Cooperative build cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::BuildError;
use crate::step::BuildStep;

/// Shared cancellation flag, checked between build steps.
///
/// Clones share the same flag, so a token handed to another thread (or a
/// signal handler) can stop a running build at the next step boundary.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. In-flight work is not interrupted.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with [`BuildError::Cancelled`] if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Cancelled(step)` once the token is cancelled.
    pub fn check(&self, step: BuildStep) -> Result<(), BuildError> {
        if self.is_cancelled() {
            tracing::info!("Build cancelled before {step}");
            return Err(BuildError::Cancelled(step));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.check(BuildStep::ApiContentPlacement).is_ok());

        handle.cancel();

        assert!(token.is_cancelled());
        let err = token.check(BuildStep::GeneratingHtmlToc).unwrap_err();
        assert!(matches!(err, BuildError::Cancelled(BuildStep::GeneratingHtmlToc)));
    }

    #[test]
    fn test_cancel_from_other_thread() {
        let token = CancellationToken::new();
        let handle = token.clone();
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
