//! Terminal reporting for `hb` commands.
//!
//! Everything goes to stderr so `hb render-toc` can stream HTML on stdout.

use std::fmt;

use console::{Style, Term};
use hb_build::{BuildStep, BuildWarning, ProgressSink};

pub(crate) struct Output {
    term: Term,
    step: Style,
    code: Style,
    done: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            step: Style::new().cyan().bold(),
            code: Style::new().yellow().bold(),
            done: Style::new().green(),
            failed: Style::new().red(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(self.done.apply_to(msg));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(self.failed.apply_to(msg));
    }

    /// `warning BE0060: message`, code highlighted.
    pub(crate) fn build_warning(&self, warning: &BuildWarning) {
        self.line(format_args!(
            "warning {}: {}",
            self.code.apply_to(&warning.code),
            warning.message
        ));
    }

    fn line(&self, text: impl fmt::Display) {
        // Nothing useful to do if stderr is gone
        let _ = self.term.write_line(&text.to_string());
    }
}

/// Step headings are numbered against the full step list.
impl ProgressSink for Output {
    fn report(&mut self, step: Option<BuildStep>, message: fmt::Arguments<'_>) {
        match step {
            Some(step) => self.line(self.step.apply_to(step_heading(step, message))),
            None => self.line(message),
        }
    }
}

fn step_heading(step: BuildStep, message: fmt::Arguments<'_>) -> String {
    let number = BuildStep::ALL
        .iter()
        .position(|s| *s == step)
        .map_or(0, |index| index + 1);
    format!("[{number}/{}] {message}", BuildStep::ALL.len())
}
