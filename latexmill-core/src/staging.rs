use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::error::BuildError;

const SOURCE_EXTENSIONS: &[&str] = &["tex", "bib", "cls"];
const VENDOR_EXTENSIONS: &[&str] = &["sty", "clo", "cls", "cfg"];
const GRAPHICS_EXTENSIONS: &[&str] = &["eps", "jpg", "png", "pdf"];

fn staging_error(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::Staging {
        path: path.to_path_buf(),
        source,
    }
}

/// Remove `build_dir` if it exists and create it empty.
pub fn clean_build_dir(build_dir: &Path) -> Result<(), BuildError> {
    if build_dir.exists() {
        fs::remove_dir_all(build_dir).map_err(staging_error(build_dir))?;
        debug!(path = %build_dir.display(), "[STAGE] Removed previous build dir");
    }
    fs::create_dir_all(build_dir).map_err(staging_error(build_dir))?;
    Ok(())
}

/// Copy the files directly inside `dir` whose extension is listed into
/// `target`. A missing `dir` copies nothing. Returns the copied paths, sorted.
pub fn copy_files(dir: &Path, extensions: &[&str], target: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        debug!(path = %dir.display(), "[STAGE] Skipping missing directory");
        return Ok(Vec::new());
    }
    let mut matches = Vec::new();
    for entry in fs::read_dir(dir).map_err(staging_error(dir))? {
        let path = entry.map_err(staging_error(dir))?.path();
        let wanted = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.contains(&e));
        if wanted {
            matches.push(path);
        }
    }
    matches.sort();
    for path in &matches {
        if let Some(name) = path.file_name() {
            let dest = target.join(name);
            fs::copy(path, &dest).map_err(staging_error(path))?;
        }
    }
    Ok(matches)
}

/// Clean the build dir and copy sources, vendor files and graphics into it.
pub fn stage(config: &ProjectConfig) -> Result<usize, BuildError> {
    clean_build_dir(&config.build_dir)?;
    let mut copied = 0;
    for (dir, extensions) in [
        (&config.source_dir, SOURCE_EXTENSIONS),
        (&config.vendor_dir, VENDOR_EXTENSIONS),
        (&config.graphics_dir, GRAPHICS_EXTENSIONS),
    ] {
        copied += copy_files(dir, extensions, &config.build_dir)?.len();
    }
    info!(
        build_dir = %config.build_dir.display(),
        files = copied,
        "[STAGE] Build dir prepared"
    );
    Ok(copied)
}
