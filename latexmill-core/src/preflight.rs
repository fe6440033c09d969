use std::path::Path;

use tracing::{error, info};

use crate::error::BuildError;
use crate::request::BuildRequest;

/// Check that every declared content file exists under `source_dir`.
///
/// Files are checked in declaration order and the first missing one is
/// reported. No tool may run when this fails.
pub fn check_declared_sources(request: &BuildRequest, source_dir: &Path) -> Result<(), BuildError> {
    for file in &request.content {
        let path = source_dir.join(file);
        if !path.exists() {
            error!(path = %path.display(), "[PREFLIGHT] Declared source file missing");
            return Err(BuildError::DeclaredSourceMissing { path });
        }
    }
    info!(
        files = request.content.len(),
        "[PREFLIGHT] All declared source files present"
    );
    Ok(())
}
