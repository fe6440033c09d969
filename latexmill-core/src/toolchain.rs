use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::contract::Toolchain;
use crate::error::BuildError;

/// Runs real processes found on PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolchain;

impl SystemToolchain {
    pub fn new() -> Self {
        Self
    }
}

fn launch_error(program: &Path, source: std::io::Error) -> BuildError {
    BuildError::Launch {
        executable: program.display().to_string(),
        source,
    }
}

#[async_trait]
impl Toolchain for SystemToolchain {
    fn resolve(&self, executable: &str) -> Option<PathBuf> {
        let candidate = Path::new(executable);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        let path = env::var_os("PATH")?;
        let found = env::split_paths(&path)
            .map(|dir| dir.join(executable))
            .find(|p| p.is_file());
        debug!(executable, found = ?found, "Resolved executable");
        found
    }

    async fn capture(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<String, BuildError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| launch_error(program, e))?;
        debug!(
            program = %program.display(),
            status = ?output.status,
            "Process exited"
        );
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    async fn interactive(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<bool, BuildError> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .await
            .map_err(|e| launch_error(program, e))?;
        Ok(status.success())
    }
}
