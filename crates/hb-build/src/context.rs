//! Composition state threaded through the build steps.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use hb_config::Config;
use hb_toc::{HelpFormat, PlacementDecision, PlacementSettings};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::warnings::BuildWarning;

const CONCEPTUAL_TOC: &str = "_ConceptualTOC_.xml";
const API_TOC: &str = "toc.xml";
const WEB_TOC: &str = "WebTOC.xml";
const HTML_TOC: &str = "WebTOC.html";
const BUILD_STATE: &str = "build-state.json";

/// State shared by the composition steps of one build.
///
/// Created per build and handed to every step and extension; nothing outlives
/// the build except what is written to the working directory.
#[derive(Debug, Clone)]
pub struct CompositionContext {
    /// Working directory holding the intermediate files.
    pub working_dir: PathBuf,
    /// Project placement settings.
    pub settings: PlacementSettings,
    /// Compiled help file name, checked for Help 1 builds.
    pub help_file_name: String,
    /// Placement decided by the placement step.
    pub decision: Option<PlacementDecision>,
    /// Default topic, preset by the project or resolved while combining.
    pub default_topic: Option<String>,
    /// Rendered website TOC fragment.
    pub html_toc: Option<String>,
    /// Non-fatal warnings collected so far.
    pub warnings: Vec<BuildWarning>,
}

impl CompositionContext {
    pub fn new(working_dir: impl Into<PathBuf>, settings: PlacementSettings) -> Self {
        Self {
            working_dir: working_dir.into(),
            settings,
            help_file_name: "Documentation".to_owned(),
            decision: None,
            default_topic: None,
            html_toc: None,
            warnings: Vec::new(),
        }
    }

    /// Context for the project described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut context = Self::new(
            config.build_resolved.working_dir.clone(),
            config.placement_settings(),
        );
        context.help_file_name.clone_from(&config.project.help_file_name);
        context
    }

    #[must_use]
    pub fn with_help_file_name(mut self, name: impl Into<String>) -> Self {
        self.help_file_name = name.into();
        self
    }

    /// Preset the default topic; the combine step then skips resolution.
    #[must_use]
    pub fn with_default_topic(mut self, topic: impl Into<String>) -> Self {
        self.default_topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn conceptual_toc_path(&self) -> PathBuf {
        self.working_dir.join(CONCEPTUAL_TOC)
    }

    #[must_use]
    pub fn api_toc_path(&self) -> PathBuf {
        self.working_dir.join(API_TOC)
    }

    #[must_use]
    pub fn web_toc_path(&self) -> PathBuf {
        self.working_dir.join(WEB_TOC)
    }

    #[must_use]
    pub fn html_toc_path(&self) -> PathBuf {
        self.working_dir.join(HTML_TOC)
    }

    #[must_use]
    pub fn build_state_path(&self) -> PathBuf {
        self.working_dir.join(BUILD_STATE)
    }

    /// Root of the per-format build output (`Output/`).
    #[must_use]
    pub fn output_root(&self) -> PathBuf {
        self.working_dir.join("Output")
    }

    /// Build output folder of one format.
    #[must_use]
    pub fn format_output(&self, format: HelpFormat) -> PathBuf {
        self.output_root().join(format.folder_name())
    }

    /// Snapshot of the state later packaging steps need.
    #[must_use]
    pub fn state(&self) -> BuildState {
        let decision = self.decision.as_ref();
        BuildState {
            default_topic: self.default_topic.clone(),
            api_parent_id: decision.and_then(|d| d.attachment.parent_id()).map(str::to_owned),
            api_insertion_index: decision.and_then(|d| d.attachment.insertion_index()),
            api_sort_order: decision.map(|d| d.sort_order),
            root_container_id: decision.and_then(|d| d.root_container_id.clone()),
            warnings: self.warnings.clone(),
        }
    }
}

/// Composition result persisted as `build-state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildState {
    pub default_topic: Option<String>,
    pub api_parent_id: Option<String>,
    pub api_insertion_index: Option<usize>,
    pub api_sort_order: Option<i32>,
    pub root_container_id: Option<String>,
    #[serde(default)]
    pub warnings: Vec<BuildWarning>,
}

impl BuildState {
    /// Write the state atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or a file operation fails.
    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_vec_pretty(self)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&json)?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Read a previously saved state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
