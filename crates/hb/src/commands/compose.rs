//! `hb compose` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use hb_build::{Composer, CompositionContext};
use hb_config::{CliSettings, Config};
use hb_toc::{ContentPlacement, HelpFormat};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the compose command.
#[derive(Args)]
pub(crate) struct ComposeArgs {
    /// Path to configuration file (default: auto-discover hb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Working directory holding the intermediate TOC files (overrides config).
    #[arg(short, long)]
    working_dir: Option<PathBuf>,

    /// Base sort order of the TOC, -1 to leave it unset (overrides config).
    #[arg(long, allow_negative_numbers = true)]
    toc_order: Option<i32>,

    /// Where API content goes when no topic is marked as its parent
    /// (overrides config).
    #[arg(long, value_enum)]
    placement: Option<PlacementArg>,

    /// Help format to build; repeat for several (overrides config).
    #[arg(short, long = "format", value_enum)]
    formats: Vec<FormatArg>,

    /// Default topic to use instead of resolving one from the build output.
    #[arg(long, env = "HB_DEFAULT_TOPIC")]
    default_topic: Option<String>,

    /// Enable verbose output (placement decisions and file writes).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlacementArg {
    AboveNamespaces,
    BelowNamespaces,
}

impl From<PlacementArg> for ContentPlacement {
    fn from(arg: PlacementArg) -> Self {
        match arg {
            PlacementArg::AboveNamespaces => Self::AboveNamespaces,
            PlacementArg::BelowNamespaces => Self::BelowNamespaces,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    HtmlHelp1,
    MsHelp2,
    MsHelpViewer,
    Website,
    OpenXml,
    Markdown,
}

impl From<FormatArg> for HelpFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::HtmlHelp1 => Self::HtmlHelp1,
            FormatArg::MsHelp2 => Self::MsHelp2,
            FormatArg::MsHelpViewer => Self::MsHelpViewer,
            FormatArg::Website => Self::Website,
            FormatArg::OpenXml => Self::OpenXml,
            FormatArg::Markdown => Self::Markdown,
        }
    }
}

impl ComposeArgs {
    /// Execute the compose command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a composition step fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let help_formats = (!self.formats.is_empty())
            .then(|| self.formats.iter().copied().map(HelpFormat::from).collect());
        let cli_settings = CliSettings {
            working_dir: self.working_dir,
            toc_order: self.toc_order,
            content_placement: self.placement.map(ContentPlacement::from),
            help_formats,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        match &config.config_path {
            Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
            None => tracing::info!("No hb.toml found, using defaults"),
        }

        output.info(&format!(
            "Working directory: {}",
            config.build_resolved.working_dir.display()
        ));
        output.info(&format!("Formats: {}", format_list(&config.project.help_formats)));

        let mut context = CompositionContext::from_config(&config);
        if let Some(topic) = self.default_topic {
            context = context.with_default_topic(topic);
        }

        let mut composer = Composer::new(context).with_progress(Output::new());
        let state = composer.run()?;

        for warning in &state.warnings {
            output.build_warning(warning);
        }
        if let Some(topic) = &state.default_topic {
            output.info(&format!("Default topic: {topic}"));
        }
        output.success(&format!(
            "TOC composed to {}",
            composer.context().api_toc_path().display()
        ));
        Ok(())
    }
}

fn format_list(formats: &[HelpFormat]) -> String {
    formats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
