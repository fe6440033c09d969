//! # contract: seams between the build logic and the outside world
//!
//! Two traits live here:
//! - [`Toolchain`] resolves executables and runs them. The system
//!   implementation is [`crate::toolchain::SystemToolchain`]; tests use the
//!   generated `MockToolchain`.
//! - [`Reporter`] relays notices, warnings and errors to the user.
//!   [`crate::reporter::ConsoleReporter`] prints them to stdout.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; the mocks are exported behind
//!   the default `test-export-mocks` feature so integration tests and the CLI
//!   crate can script toolchain output.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;

use crate::error::BuildError;

/// Resolves and runs external executables.
///
/// Implementors must block (await) until the child process exits: the build
/// is strictly sequential and downstream stages rely on files the previous
/// process wrote into `cwd`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Locate an executable by name. Returns `None` if it cannot be found.
    fn resolve(&self, executable: &str) -> Option<PathBuf>;

    /// Run `program` in `cwd` with stdin closed and return stdout followed by
    /// stderr as text.
    async fn capture(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<String, BuildError>;

    /// Run `program` attached to the user's terminal (viewers, spell
    /// checker). Returns whether the process exited successfully.
    async fn interactive(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<bool, BuildError>;
}

/// Human-readable relay of build progress and toolchain diagnostics.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Reporter: Send + Sync {
    fn notice(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}
