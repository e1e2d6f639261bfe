//! `hb render-toc` command implementation.

use std::io::Write as _;
use std::path::PathBuf;

use clap::Args;
use hb_toc::{read_web_toc, render_html_toc};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render-toc command.
#[derive(Args)]
pub(crate) struct RenderTocArgs {
    /// Website TOC file (`WebTOC.xml`).
    input: PathBuf,

    /// Write the HTML fragment to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderTocArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let entries = read_web_toc(&self.input)?;
        let html = render_html_toc(&entries);

        match self.output {
            Some(path) => {
                std::fs::write(&path, &html)?;
                Output::new().success(&format!(
                    "Rendered {} top-level node(s) to {}",
                    entries.len(),
                    path.display()
                ));
            }
            None => std::io::stdout().lock().write_all(html.as_bytes())?,
        }
        Ok(())
    }
}
