//! One external tool run: resolve, check input, execute, classify, relay.

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::contract::{Reporter, Toolchain};
use crate::diagnostics::{classify_with, Diagnostics, ErrorBlockStrategy, SpecialConditions, ToolKind};
use crate::error::BuildError;

/// Identifies one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub executable: String,
    /// Relative to the working directory the tool runs in.
    pub input: PathBuf,
    /// Arguments placed before the input file.
    pub args: Vec<String>,
    pub silent: bool,
}

impl ToolSpec {
    pub fn new(kind: ToolKind, executable: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            executable: executable.into(),
            input: input.into(),
            args: Vec::new(),
            silent: false,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}

/// Everything one invocation produced. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub kind: ToolKind,
    pub executable: String,
    pub raw_output: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub conditions: SpecialConditions,
    /// False when the classifier found error blocks.
    pub success: bool,
}

impl InvocationResult {
    fn new(spec: &ToolSpec, raw_output: String, diagnostics: Diagnostics) -> Self {
        Self {
            kind: spec.kind,
            executable: spec.executable.clone(),
            success: diagnostics.errors.is_empty(),
            raw_output,
            warnings: diagnostics.warnings,
            errors: diagnostics.errors,
            conditions: diagnostics.conditions,
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            warnings: self.warnings.clone(),
            errors: self.errors.clone(),
            conditions: self.conditions,
        }
    }

    /// Relay warnings and errors verbatim and in order. Conversion tools are
    /// never classified, so their raw output lines are relayed instead.
    pub fn relay(&self, reporter: &dyn Reporter) {
        if self.kind.is_conversion() {
            let lines: Vec<&str> = self.raw_output.lines().filter(|l| !l.is_empty()).collect();
            if !lines.is_empty() {
                reporter.notice(&format!("Output from {}:", self.executable));
                for line in lines {
                    reporter.warning(line);
                }
            }
            return;
        }
        if !self.warnings.is_empty() {
            reporter.notice(&format!("Warnings from {}:", self.executable));
            for w in &self.warnings {
                reporter.warning(w);
            }
        }
        if !self.errors.is_empty() {
            reporter.notice(&format!("Errors from {}:", self.executable));
            for e in &self.errors {
                reporter.error(e);
            }
        }
    }
}

/// Runs tools through a [`Toolchain`] inside one working directory.
pub struct ToolInvoker<'a> {
    toolchain: &'a dyn Toolchain,
    reporter: &'a dyn Reporter,
    workdir: PathBuf,
    error_blocks: ErrorBlockStrategy,
}

impl<'a> ToolInvoker<'a> {
    pub fn new(
        toolchain: &'a dyn Toolchain,
        reporter: &'a dyn Reporter,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            toolchain,
            reporter,
            workdir: workdir.into(),
            error_blocks: ErrorBlockStrategy::default(),
        }
    }

    pub fn with_error_blocks(mut self, strategy: ErrorBlockStrategy) -> Self {
        self.error_blocks = strategy;
        self
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter
    }

    pub async fn invoke(&self, spec: &ToolSpec) -> Result<InvocationResult, BuildError> {
        let program = match self.toolchain.resolve(&spec.executable) {
            Some(p) => p,
            None => {
                error!(executable = %spec.executable, "[TOOL] Executable not found");
                return Err(BuildError::ToolUnavailable {
                    executable: spec.executable.clone(),
                });
            }
        };

        if !self.workdir.join(&spec.input).exists() {
            error!(
                executable = %spec.executable,
                input = %spec.input.display(),
                "[TOOL] Input file not found"
            );
            return Err(BuildError::InputMissing {
                executable: spec.executable.clone(),
                input: spec.input.clone(),
            });
        }

        let mut args = spec.args.clone();
        args.push(spec.input.to_string_lossy().into_owned());

        info!(
            executable = %spec.executable,
            program = %program.display(),
            input = %spec.input.display(),
            "[TOOL] Running"
        );
        let raw = self
            .toolchain
            .capture(&program, &args, &self.workdir)
            .await?;
        debug!(executable = %spec.executable, bytes = raw.len(), "[TOOL] Captured output");

        let diagnostics = classify_with(spec.kind, &raw, self.error_blocks);
        let result = InvocationResult::new(spec, raw, diagnostics);
        info!(
            executable = %spec.executable,
            warnings = result.warnings.len(),
            errors = result.errors.len(),
            "[TOOL] Finished"
        );

        if !spec.silent {
            result.relay(self.reporter);
        }
        Ok(result)
    }
}
