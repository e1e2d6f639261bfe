//! HB CLI - help file TOC composition.
//!
//! Provides commands for:
//! - `compose`: Merge the conceptual and API TOC files of a build
//! - `render-toc`: Render a website TOC file as an HTML tree view

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ComposeArgs, RenderTocArgs};
use output::Output;

/// HB - Help file TOC composition.
#[derive(Parser)]
#[command(name = "hb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the TOC composition steps in a working directory.
    Compose(ComposeArgs),
    /// Render a `WebTOC.xml` file as an HTML tree view.
    RenderToc(RenderTocArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Compose(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compose(args) => args.execute(),
        Commands::RenderToc(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compose_overrides() {
        let cli = Cli::try_parse_from([
            "hb",
            "compose",
            "--working-dir",
            "obj",
            "--toc-order",
            "-1",
            "--format",
            "website",
            "--format",
            "html-help1",
            "--placement",
            "below-namespaces",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Compose(_)));
    }

    #[test]
    fn test_compose_has_no_output_dir() {
        assert!(Cli::try_parse_from(["hb", "compose", "--output-dir", "Help"]).is_err());
    }

    #[test]
    fn test_render_toc_requires_input() {
        assert!(Cli::try_parse_from(["hb", "render-toc"]).is_err());
    }
}
