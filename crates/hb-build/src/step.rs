//! Named build steps and extension point slots.

use std::fmt;

/// A composition build step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildStep {
    /// Decide where the API content attaches to the conceptual TOC.
    ApiContentPlacement,
    /// Merge the conceptual and API TOC files into `toc.xml`.
    CombiningIntermediateTocFiles,
    /// Check Help 1 output file names for characters the compiler rejects.
    CheckingHelpFileNames,
    /// Render the website TOC as HTML.
    GeneratingHtmlToc,
}

impl BuildStep {
    /// Steps in execution order.
    pub const ALL: [Self; 4] = [
        Self::ApiContentPlacement,
        Self::CombiningIntermediateTocFiles,
        Self::CheckingHelpFileNames,
        Self::GeneratingHtmlToc,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiContentPlacement => "ApiContentPlacement",
            Self::CombiningIntermediateTocFiles => "CombiningIntermediateTocFiles",
            Self::CheckingHelpFileNames => "CheckingHelpFileNames",
            Self::GeneratingHtmlToc => "GeneratingHtmlToc",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot in which an extension runs relative to a step's own work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionBehavior {
    /// Runs before the step body.
    Before,
    /// Replaces the step body (and its before/after extensions).
    InsteadOf,
    /// Runs after the step body.
    After,
}

impl fmt::Display for ExecutionBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::InsteadOf => "instead of",
            Self::After => "after",
        })
    }
}
