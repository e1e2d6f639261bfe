//! Project configuration for HB.
//!
//! Parses `hb.toml` with serde and discovers it in the current directory or
//! its parents. CLI settings are applied during load via [`CliSettings`].
//!
//! ```toml
//! [project]
//! toc_order = -1
//! content_placement = "above-namespaces"
//! help_formats = ["html-help1", "website"]
//! help_file_name = "Documentation"
//!
//! [build]
//! working_dir = "obj"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `project.help_file_name`
//! and `build.working_dir`.

mod expand;

use std::path::{Path, PathBuf};

use hb_toc::{ContentPlacement, HelpFormat, HelpFormats, PlacementSettings, UNSET_SORT_ORDER};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hb.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the working (intermediate files) directory.
    pub working_dir: Option<PathBuf>,
    /// Override the base TOC sort order.
    pub toc_order: Option<i32>,
    /// Override the content placement policy.
    pub content_placement: Option<ContentPlacement>,
    /// Override the requested help formats.
    pub help_formats: Option<Vec<HelpFormat>>,
}

/// Project configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Help project settings.
    pub project: ProjectConfig,
    /// Build directories (relative strings from TOML).
    build: BuildConfigRaw,

    /// Resolved build directories (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildPaths,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Help project settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Base sort order for the TOC, -1 when unset.
    pub toc_order: i32,
    /// Where API content goes when no anchor topic is declared.
    pub content_placement: ContentPlacement,
    /// Help formats to build.
    pub help_formats: Vec<HelpFormat>,
    /// Compiled help file name, without extension.
    pub help_file_name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            toc_order: UNSET_SORT_ORDER,
            content_placement: ContentPlacement::AboveNamespaces,
            help_formats: vec![HelpFormat::HtmlHelp1],
            help_file_name: "Documentation".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    working_dir: Option<String>,
}

/// Resolved build directories.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    /// Working directory holding the intermediate TOC files and the
    /// per-format `Output` folders.
    pub working_dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`build.working_dir`").
        field: String,
        /// Error message (e.g., "${`HB_OBJ`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `hb.toml` in the current directory and parents, falling back to
    /// defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// result is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting settings are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Requested help formats as a set.
    #[must_use]
    pub fn formats(&self) -> HelpFormats {
        self.project.help_formats.iter().copied().collect()
    }

    /// Settings consumed by the placement resolver.
    #[must_use]
    pub fn placement_settings(&self) -> PlacementSettings {
        PlacementSettings {
            toc_order: self.project.toc_order,
            content_placement: self.project.content_placement,
            formats: self.formats(),
        }
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(working_dir) = &settings.working_dir {
            self.build_resolved.working_dir.clone_from(working_dir);
        }
        if let Some(toc_order) = settings.toc_order {
            self.project.toc_order = toc_order;
        }
        if let Some(placement) = settings.content_placement {
            self.project.content_placement = placement;
        }
        if let Some(formats) = &settings.help_formats {
            self.project.help_formats.clone_from(formats);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            project: ProjectConfig::default(),
            build: BuildConfigRaw::default(),
            build_resolved: BuildPaths {
                working_dir: base.join("obj"),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.toc_order < UNSET_SORT_ORDER {
            return Err(ConfigError::Validation(format!(
                "project.toc_order must be -1 (unset) or greater, got {}",
                self.project.toc_order
            )));
        }
        if self.project.help_formats.is_empty() {
            return Err(ConfigError::Validation(
                "project.help_formats must name at least one format".to_owned(),
            ));
        }
        require_non_empty(&self.project.help_file_name, "project.help_file_name")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_in_place(&mut self.project.help_file_name, "project.help_file_name")?;
        if let Some(dir) = &mut self.build.working_dir {
            expand::expand_in_place(dir, "build.working_dir")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.build_resolved = BuildPaths {
            working_dir: resolve(self.build.working_dir.as_deref(), "obj"),
        };
    }
}
