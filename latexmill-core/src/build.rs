//! High-level pipeline: pre-flight → stage → converge → convert → distribute.
//!
//! # Responsibilities
//! - Abort before any tool runs when a declared source file is missing
//! - Prepare the staging (build) directory and, if configured, render the
//!   base document into it
//! - Drive the [`ConvergenceEngine`] and then the [`ConversionPipeline`]
//! - Copy the artifact to the distribution directory
//!
//! # Error Handling
//! Each fatal step returns immediately with a [`BuildError`]; nothing after
//! the failing step runs. Toolchain diagnostics are not errors and are
//! carried in the returned [`BuildReport`].

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{ProjectConfig, ToolNames};
use crate::contract::{Reporter, Toolchain};
use crate::conversion::ConversionPipeline;
use crate::diagnostics::ErrorBlockStrategy;
use crate::distribution::{distribute, distribution_file};
use crate::engine::{BoundedPolicy, ConvergenceEngine, RerunPolicy};
use crate::error::BuildError;
use crate::preflight::check_declared_sources;
use crate::request::{BuildRequest, OutputFormat};
use crate::staging::stage;
use crate::template::write_base_document;
use crate::tool::{InvocationResult, ToolInvoker};

/// What a completed build did.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub format: OutputFormat,
    pub passes: u32,
    pub bibliography_passes: u32,
    pub converged: bool,
    /// Final text-compiler pass.
    pub text: InvocationResult,
    pub bibliography: Option<InvocationResult>,
    pub conversions: Vec<InvocationResult>,
    /// The artifact inside the staging directory.
    pub artifact: PathBuf,
    /// Where the artifact was copied, if distribution ran.
    pub distributed: Option<PathBuf>,
}

impl BuildReport {
    pub fn conversion_stages(&self) -> usize {
        self.conversions.len()
    }

    /// True when the final latex pass reported no error blocks.
    pub fn success(&self) -> bool {
        self.converged && self.text.success
    }
}

static DEFAULT_POLICY: BoundedPolicy = BoundedPolicy;

pub struct Builder<'a> {
    toolchain: &'a dyn Toolchain,
    reporter: &'a dyn Reporter,
    tools: ToolNames,
    policy: &'a dyn RerunPolicy,
    error_blocks: ErrorBlockStrategy,
}

impl<'a> Builder<'a> {
    pub fn new(toolchain: &'a dyn Toolchain, reporter: &'a dyn Reporter) -> Self {
        Self {
            toolchain,
            reporter,
            tools: ToolNames::default(),
            policy: &DEFAULT_POLICY,
            error_blocks: ErrorBlockStrategy::default(),
        }
    }

    pub fn with_tools(mut self, tools: ToolNames) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_policy(mut self, policy: &'a dyn RerunPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_error_blocks(mut self, strategy: ErrorBlockStrategy) -> Self {
        self.error_blocks = strategy;
        self
    }

    /// Pre-flight, converge and convert inside an already prepared
    /// `staging_dir`. Declared content is checked under `source_dir`.
    pub async fn compile(
        &self,
        request: &BuildRequest,
        source_dir: &Path,
        staging_dir: &Path,
    ) -> Result<BuildReport, BuildError> {
        check_declared_sources(request, source_dir)?;

        let invoker = ToolInvoker::new(self.toolchain, self.reporter, staging_dir)
            .with_error_blocks(self.error_blocks);
        let engine = ConvergenceEngine::new(&invoker, &self.tools, self.policy);
        let outcome = engine.converge(request).await?;

        let conversions = ConversionPipeline::new(&invoker, &self.tools)
            .run(request)
            .await?;

        Ok(BuildReport {
            format: request.format,
            passes: outcome.passes(),
            bibliography_passes: outcome.bibliography_passes(),
            converged: outcome.state.converged(),
            text: outcome.text,
            bibliography: outcome.bibliography,
            conversions,
            artifact: staging_dir.join(request.artifact_file()),
            distributed: None,
        })
    }

    /// Full build for a project: pre-flight, staging, preamble, compile and
    /// distribution.
    pub async fn build(
        &self,
        config: &ProjectConfig,
        format: OutputFormat,
    ) -> Result<BuildReport, BuildError> {
        let request = config.build_request(format);
        info!(base = %request.base, %format, "[BUILD] Starting build");

        // Checked here as well so a missing file aborts before the build dir
        // is wiped.
        check_declared_sources(&request, &config.source_dir)?;

        stage(config)?;
        if let Some(doc) = &config.document {
            write_base_document(config, doc, &config.build_dir)?;
        }

        let mut report = match self
            .compile(&request, &config.source_dir, &config.build_dir)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "[BUILD][ERROR] Build aborted");
                return Err(e);
            }
        };

        let destination = distribution_file(config, format);
        distribute(&report.artifact, &destination)?;
        report.distributed = Some(destination);

        self.reporter.notice(&format!(
            "Build of {format} completed for: {} in {}",
            config.base_latex_file(),
            config.build_dir.display()
        ));
        info!(
            passes = report.passes,
            bibliography_passes = report.bibliography_passes,
            conversions = report.conversion_stages(),
            "[BUILD] Build complete"
        );
        Ok(report)
    }
}
