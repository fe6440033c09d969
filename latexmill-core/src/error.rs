use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that abort a build.
///
/// Toolchain warnings and errors are not represented here: they travel inside
/// [`crate::tool::InvocationResult`] and are relayed once the convergence
/// policy has run its course.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The named executable could not be found on PATH.
    #[error("Running of {executable} aborted. Executable not found")]
    ToolUnavailable { executable: String },

    /// A tool's input file does not exist in the staging directory.
    #[error("Running of {executable} aborted. Input file: {} not found", input.display())]
    InputMissing { executable: String, input: PathBuf },

    /// A declared content file is absent (pre-flight check).
    #[error("Build aborted. Source file: {} not found", path.display())]
    DeclaredSourceMissing { path: PathBuf },

    /// The process could not be spawned or awaited.
    #[error("Failed to launch {executable}: {source}")]
    Launch {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// Preparing or populating the staging directory failed.
    #[error("Failed to stage {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source directory could not be listed.
    #[error("Failed to read source directory {}: {source}", path.display())]
    SourceListing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering the preamble template failed.
    #[error("Template error: {0}")]
    Template(String),

    /// Copying the converged artifact to the distribution directory failed.
    #[error("Failed to distribute {}: {source}", path.display())]
    Distribution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An unknown source-control provider was configured.
    #[error("Unknown source control provider: {0}")]
    UnknownScmProvider(String),
}

impl BuildError {
    /// Returns true for errors raised before any external tool ran.
    pub fn is_preflight(&self) -> bool {
        matches!(self, BuildError::DeclaredSourceMissing { .. })
    }
}
