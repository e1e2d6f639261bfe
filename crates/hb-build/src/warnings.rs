//! Non-fatal build warnings.
//!
//! The Help 1 compiler fails on paths containing a comma or `.h`, so the
//! output folder, the help file name and every output file are checked.
//! Merged TOC ids that collide once containers take their title as id are
//! reported too.

use std::path::Path;

use hb_toc::{OutputLocator, Toc};

/// Diagnostic code for Help 1 file name warnings.
pub const HELP1_FILE_NAME_CODE: &str = "BE0060";

/// Diagnostic code for duplicate ids in the merged TOC.
pub const DUPLICATE_TOC_ID_CODE: &str = "HB0001";

/// A non-fatal build warning.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BuildWarning {
    /// Diagnostic code.
    pub code: String,
    /// Human readable message.
    pub message: String,
}

impl BuildWarning {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_owned(),
            message: message.into(),
        }
    }
}

/// True if `name` contains a comma or `.h` (any case).
#[must_use]
pub fn breaks_help1_compiler(name: &str) -> bool {
    name.contains(',') || name.to_ascii_lowercase().contains(".h")
}

/// True if an output file name would break the Help 1 compiler.
///
/// A trailing `.htm` / `.html` extension is ignored.
#[must_use]
pub fn is_problem_file_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    let stem = match lower.rfind(".htm") {
        Some(pos) if lower.ends_with(".htm") || lower.ends_with(".html") => &name[..pos],
        _ => name,
    };
    breaks_help1_compiler(stem)
}

/// Check the Help 1 output folder, the help file name and every file under
/// the folder.
pub fn scan_help1_output(folder: &Path, help_file_name: &str) -> Vec<BuildWarning> {
    let mut warnings = Vec::new();

    let folder_name = folder.to_string_lossy();
    if breaks_help1_compiler(&folder_name) {
        warnings.push(BuildWarning::new(
            HELP1_FILE_NAME_CODE,
            format!(
                "The file path '{folder_name}' contains a comma or '.h' which may cause the Help 1 \
                 compiler to fail."
            ),
        ));
    }

    if breaks_help1_compiler(help_file_name) {
        warnings.push(BuildWarning::new(
            HELP1_FILE_NAME_CODE,
            format!(
                "The help file name '{help_file_name}' contains a comma or '.h' which may cause the \
                 Help 1 compiler to fail."
            ),
        ));
    }

    for file in OutputLocator::new(folder).files() {
        if is_problem_file_name(&file) {
            warnings.push(BuildWarning::new(
                HELP1_FILE_NAME_CODE,
                format!(
                    "The filename '{file}' contains a comma or '.h' which may cause the Help 1 \
                     compiler to fail."
                ),
            ));
        }
    }

    for warning in &warnings {
        tracing::warn!(code = %warning.code, "{}", warning.message);
    }
    warnings
}

/// One warning per id that appears more than once in the merged TOC.
pub fn duplicate_id_warnings(merged: &Toc) -> Vec<BuildWarning> {
    merged
        .duplicate_ids()
        .into_iter()
        .map(|id| {
            tracing::warn!(code = DUPLICATE_TOC_ID_CODE, "Duplicate TOC id '{id}'");
            BuildWarning::new(
                DUPLICATE_TOC_ID_CODE,
                format!(
                    "The merged table of contents contains more than one entry with the ID \
                     '{id}'. Give the containers distinct titles."
                ),
            )
        })
        .collect()
}
