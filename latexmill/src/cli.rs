///
/// This module implements the CLI interface for latexmill: argument parsing, command routing,
/// and user-visible invocations.
///
/// All build logic (convergence, conversion, staging, distribution) lives in [`latexmill-core`].
/// This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: run `latexmill` in a project directory, `--help` lists the flags.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`], or [`run_with`]
///   to supply a toolchain and reporter.
///
/// [`latexmill-core`]: ../../latexmill-core/
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use latexmill_core::build::Builder;
use latexmill_core::contract::{Reporter, Toolchain};
use latexmill_core::reporter::ConsoleReporter;
use latexmill_core::request::OutputFormat;
use latexmill_core::spell;
use latexmill_core::toolchain::SystemToolchain;
use latexmill_core::viewer;
use std::path::PathBuf;

/// CLI for latexmill: build, view or spell check a latex project.
#[derive(Parser, Debug)]
#[clap(
    name = "latexmill",
    version,
    about = "Build latex documents into dvi, ps or pdf with as few passes as needed"
)]
pub struct Cli {
    /// Select output format
    #[clap(short, long, value_enum, default_value_t = Format::Pdf)]
    pub format: Format,

    /// Build, then open the document in a viewer
    #[clap(short, long)]
    pub view: bool,

    /// Spell check the source files instead of building
    #[clap(short, long)]
    pub spell: bool,

    /// Path to the YAML config file (defaults to ./config.yml when present)
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Dvi,
    Ps,
    Pdf,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Dvi => OutputFormat::Dvi,
            Format::Ps => OutputFormat::Ps,
            Format::Pdf => OutputFormat::Pdf,
        }
    }
}

/// Async CLI entrypoint using the real toolchain and console output.
pub async fn run(cli: Cli) -> Result<()> {
    run_with(cli, &SystemToolchain::new(), &ConsoleReporter).await
}

/// Async CLI entrypoint with an injected toolchain and reporter.
pub async fn run_with(cli: Cli, toolchain: &dyn Toolchain, reporter: &dyn Reporter) -> Result<()> {
    tracing::info!(?cli, "cli_started");

    let config = load_config(cli.config.as_deref())?;
    let format = OutputFormat::from(cli.format);

    if cli.spell {
        tracing::info!(command = "spell", "Starting spell check");
        return spell::check(&config, toolchain, reporter)
            .await
            .map(|_| ())
            .map_err(|e| {
                reporter.error(&e.to_string());
                anyhow::Error::new(e)
            });
    }

    tracing::info!(command = "build", %format, "Starting build");
    let builder = Builder::new(toolchain, reporter).with_tools(config.tools.clone());
    let report = match builder.build(&config, format).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(command = "build", error = %e, "Build failed");
            reporter.error(&e.to_string());
            return Err(anyhow::Error::new(e));
        }
    };
    if !report.success() {
        tracing::warn!(
            command = "build",
            errors = report.text.errors.len(),
            "Build finished with latex errors"
        );
    }

    if cli.view {
        tracing::info!(command = "view", %format, "Launching viewer");
        if let Err(e) = viewer::view(&config, format, toolchain, reporter).await {
            reporter.error(&e.to_string());
            return Err(anyhow::Error::new(e));
        }
    }
    Ok(())
}
