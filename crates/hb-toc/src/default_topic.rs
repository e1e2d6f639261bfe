//! Default topic resolution.
//!
//! The landing page is the first topic of the merged TOC that is bound to a
//! file, confirmed against the per-format build output.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::entry::Toc;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// File stem of the default topic candidate.
///
/// Takes the first top-level entry. A container without a file is descended
/// through its first-child chain until an entry with a file is found.
#[must_use]
pub fn default_topic_candidate(toc: &Toc) -> Option<&str> {
    let mut entry = toc.entries().first()?;
    loop {
        if let Some(file) = &entry.file {
            return Some(file);
        }
        entry = entry.children.first()?;
    }
}

/// Recursive file search over the build output folder.
///
/// Hidden files and folders are skipped. Within a folder, files are visited
/// in name order before subfolders, so results are deterministic.
#[derive(Debug, Clone)]
pub struct OutputLocator {
    root: PathBuf,
}

impl OutputLocator {
    /// Create a locator rooted at the `Output` folder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files under the root, as `/`-separated paths relative to it.
    ///
    /// Returns an empty list if the root does not exist.
    #[must_use]
    pub fn files(&self) -> Vec<String> {
        let mut files = Vec::new();
        self.walk(&self.root, "", &mut |relative| {
            files.push(relative.to_owned());
            false
        });
        files
    }

    /// First file (relative to the root) whose name is `<stem>.htm` or
    /// `<stem>.html`, ignoring case.
    #[must_use]
    pub fn find_page(&self, stem: &str) -> Option<String> {
        let escaped = Pattern::escape(stem);
        let patterns = [
            Pattern::new(&format!("{escaped}.htm")).ok()?,
            Pattern::new(&format!("{escaped}.html")).ok()?,
        ];

        let mut found = None;
        self.walk(&self.root, "", &mut |relative| {
            let name = relative.rsplit('/').next().unwrap_or(relative);
            if patterns.iter().any(|p| p.matches_with(name, MATCH_OPTIONS)) {
                found = Some(relative.to_owned());
                true
            } else {
                false
            }
        });
        found
    }

    /// Visit files depth-first; `visit` returns true to stop the walk.
    fn walk(&self, dir: &Path, prefix: &str, visit: &mut dyn FnMut(&str) -> bool) -> bool {
        let Ok(entries) = fs::read_dir(dir) else {
            return false;
        };

        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                let name = e.file_name().to_string_lossy().into_owned();
                (is_dir, name, e.path())
            })
            .filter(|(_, name, _)| !name.starts_with('.'))
            .collect();
        entries.sort();

        for (is_dir, name, path) in entries {
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            let stop = if is_dir {
                self.walk(&path, &relative, visit)
            } else {
                visit(&relative)
            };
            if stop {
                return true;
            }
        }
        false
    }
}

/// Locate the default topic page in the build output.
///
/// Returns the page path relative to the output root with the leading
/// per-format folder removed (`Output/Website/html/Welcome.htm` becomes
/// `html/Welcome.htm`), or `None` if the TOC has no file-bound topic or the
/// page was not generated.
#[must_use]
pub fn resolve_default_topic(toc: &Toc, output_root: &Path) -> Option<String> {
    let candidate = default_topic_candidate(toc)?;
    let locator = OutputLocator::new(output_root);

    let Some(found) = locator.find_page(candidate) else {
        tracing::debug!(
            "Default topic candidate '{candidate}' not found under {}",
            output_root.display()
        );
        return None;
    };

    let topic = match found.split_once('/') {
        Some((_format_folder, rest)) => rest.to_owned(),
        None => found,
    };
    tracing::debug!("Default topic: {topic}");
    Some(topic)
}
