//! TOC composition pipeline.
//!
//! Runs the composition steps in order:
//!
//! 1. [`BuildStep::ApiContentPlacement`]: resolve where the API content goes,
//!    write the sort orders back to the conceptual and API TOC files.
//! 2. [`BuildStep::CombiningIntermediateTocFiles`]: merge both files into
//!    `toc.xml` and resolve the default topic.
//! 3. [`BuildStep::CheckingHelpFileNames`]: Help 1 builds only.
//! 4. [`BuildStep::GeneratingHtmlToc`]: website builds only.
//!
//! Every step reports progress, honors cancellation and runs its extensions.
//! The final state is written to `build-state.json`.

use std::fmt;

use hb_toc::{
    ConfigurationError, HelpFormat, HelpFormats, PlacementDecision, Toc, annotate_api_toc,
    merge_tocs, read_toc_if_exists, read_web_toc, render_html_toc, resolve_default_topic,
    resolve_placement, save_toc,
};

use crate::cancel::CancellationToken;
use crate::context::{BuildState, CompositionContext};
use crate::error::BuildError;
use crate::plugin::{PlugIn, PlugInRegistry};
use crate::progress::{ProgressSink, TracingProgress};
use crate::step::{BuildStep, ExecutionBehavior};
use crate::warnings::{duplicate_id_warnings, scan_help1_output};

/// Formats that need a default topic.
fn default_topic_formats() -> HelpFormats {
    [HelpFormat::HtmlHelp1, HelpFormat::Website].into_iter().collect()
}

/// Runs the composition steps against a working directory.
pub struct Composer {
    context: CompositionContext,
    plugins: PlugInRegistry,
    progress: Box<dyn ProgressSink>,
    cancellation: CancellationToken,
}

impl Composer {
    /// Create a composer reporting progress through `tracing`.
    pub fn new(context: CompositionContext) -> Self {
        Self {
            context,
            plugins: PlugInRegistry::new(),
            progress: Box::new(TracingProgress),
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_plugin<P: PlugIn + 'static>(mut self, plugin: P) -> Self {
        self.plugins.register(plugin);
        self
    }

    #[must_use]
    pub fn with_progress<S: ProgressSink + 'static>(mut self, progress: S) -> Self {
        self.progress = Box::new(progress);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn context(&self) -> &CompositionContext {
        &self.context
    }

    /// Run every step and persist the build state.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Nothing is persisted for the failing
    /// step.
    pub fn run(&mut self) -> Result<BuildState, BuildError> {
        self.determine_api_content_placement()?;
        self.combine_intermediate_toc_files()?;
        self.check_help_file_names()?;
        self.generate_html_toc()?;

        let state = self.context.state();
        state.save(&self.context.build_state_path())?;
        self.progress.report(
            None,
            format_args!(
                "TOC composition finished with {} warning(s)",
                self.context.warnings.len()
            ),
        );
        Ok(state)
    }

    /// Determine the placement of the API content.
    ///
    /// # Errors
    ///
    /// Fails on unreadable TOC files, a visible MS Help Viewer root container
    /// or a failing extension.
    pub fn determine_api_content_placement(&mut self) -> Result<(), BuildError> {
        self.run_step(
            BuildStep::ApiContentPlacement,
            format_args!("Determining API content placement..."),
            place_api_content,
        )
    }

    /// Merge the conceptual and API TOC files into `toc.xml`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable TOC files, an unresolvable default topic or a
    /// failing extension. `toc.xml` is left untouched on failure.
    pub fn combine_intermediate_toc_files(&mut self) -> Result<(), BuildError> {
        self.run_step(
            BuildStep::CombiningIntermediateTocFiles,
            format_args!("Combining conceptual and API intermediate TOC files..."),
            combine_tocs,
        )
    }

    /// Check Help 1 output file names. No-op unless Help 1 is built.
    ///
    /// # Errors
    ///
    /// Fails only if an extension fails.
    pub fn check_help_file_names(&mut self) -> Result<(), BuildError> {
        if !self.context.settings.formats.contains(HelpFormat::HtmlHelp1) {
            return Ok(());
        }
        self.run_step(
            BuildStep::CheckingHelpFileNames,
            format_args!("Checking Help 1 file names..."),
            check_help1_names,
        )
    }

    /// Render the website TOC to `WebTOC.html`. No-op unless a website is
    /// built.
    ///
    /// # Errors
    ///
    /// Fails if no TOC source can be read or written, or an extension fails.
    pub fn generate_html_toc(&mut self) -> Result<(), BuildError> {
        if !self.context.settings.formats.contains(HelpFormat::Website) {
            return Ok(());
        }
        self.run_step(
            BuildStep::GeneratingHtmlToc,
            format_args!("Generating HTML table of contents..."),
            generate_html,
        )
    }

    fn run_step(
        &mut self,
        step: BuildStep,
        message: fmt::Arguments<'_>,
        body: fn(&mut CompositionContext) -> Result<(), BuildError>,
    ) -> Result<(), BuildError> {
        self.cancellation.check(step)?;
        self.progress.report(Some(step), message);

        if self
            .plugins
            .execute(step, ExecutionBehavior::InsteadOf, &mut self.context)?
        {
            tracing::debug!("Step {step} replaced by a plug-in");
            return Ok(());
        }

        self.plugins
            .execute(step, ExecutionBehavior::Before, &mut self.context)?;
        body(&mut self.context)?;
        self.plugins
            .execute(step, ExecutionBehavior::After, &mut self.context)?;
        Ok(())
    }
}

impl fmt::Debug for Composer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("context", &self.context)
            .field("plugins", &self.plugins)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn place_api_content(context: &mut CompositionContext) -> Result<(), BuildError> {
    let api_path = context.api_toc_path();
    let conceptual_path = context.conceptual_toc_path();
    let api = read_toc_if_exists(&api_path)?.unwrap_or_default();
    let conceptual = read_toc_if_exists(&conceptual_path)?;

    let Some(conceptual) = conceptual else {
        // No conceptual content: the API TOC is used as is, ordered by the
        // project setting.
        let placement = resolve_placement(&Toc::default(), api.len(), &context.settings)?;
        write_api_sort_order(&api, &placement.decision, &api_path)?;
        context.decision = Some(placement.decision);
        return Ok(());
    };

    for id in conceptual.duplicate_ids() {
        tracing::warn!("Duplicate topic id '{id}' in {}", conceptual_path.display());
    }

    let placement = resolve_placement(&conceptual, api.len(), &context.settings)?;
    if placement.conceptual != conceptual {
        save_toc(&placement.conceptual, &conceptual_path)?;
    }
    write_api_sort_order(&api, &placement.decision, &api_path)?;
    context.decision = Some(placement.decision);
    Ok(())
}

fn write_api_sort_order(
    api: &Toc,
    decision: &PlacementDecision,
    path: &std::path::Path,
) -> Result<(), BuildError> {
    let annotated = annotate_api_toc(api, decision);
    if annotated != *api {
        save_toc(&annotated, path)?;
    }
    Ok(())
}

fn combine_tocs(context: &mut CompositionContext) -> Result<(), BuildError> {
    let api_path = context.api_toc_path();
    let api = read_toc_if_exists(&api_path)?.unwrap_or_default();
    let conceptual = read_toc_if_exists(&context.conceptual_toc_path())?;

    let decision = context
        .decision
        .clone()
        .unwrap_or_else(|| PlacementDecision::unplaced(context.settings.content_placement));
    let merged = merge_tocs(conceptual, api.clone(), &decision, context.settings.formats);

    if context.default_topic.is_none()
        && context.settings.formats.intersects(default_topic_formats())
    {
        let topic = resolve_default_topic(&merged, &context.output_root())
            .ok_or(ConfigurationError::DefaultTopicUnresolved)
            .map_err(hb_toc::TocError::from)?;
        context.default_topic = Some(topic);
    }

    if merged != api {
        save_toc(&merged, &api_path)?;
        tracing::info!("Merged TOC written to {}", api_path.display());
    }
    context.warnings.extend(duplicate_id_warnings(&merged));
    Ok(())
}

fn check_help1_names(context: &mut CompositionContext) -> Result<(), BuildError> {
    let folder = context.format_output(HelpFormat::HtmlHelp1);
    let warnings = scan_help1_output(&folder, &context.help_file_name);
    context.warnings.extend(warnings);
    Ok(())
}

fn generate_html(context: &mut CompositionContext) -> Result<(), BuildError> {
    let web_toc = context.web_toc_path();
    let html = if web_toc.exists() {
        render_html_toc(&read_web_toc(&web_toc)?)
    } else {
        tracing::debug!("{} not found, rendering the merged TOC", web_toc.display());
        let merged = read_toc_if_exists(&context.api_toc_path())?.unwrap_or_default();
        render_html_toc(merged.entries())
    };

    std::fs::write(context.html_toc_path(), &html)?;
    context.html_toc = Some(html);
    Ok(())
}
