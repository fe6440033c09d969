use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::config::ProjectConfig;
use crate::contract::{Reporter, Toolchain};
use crate::error::BuildError;

/// Content files to spell check: every `.tex` in the source dir except the
/// base document, sorted.
pub fn spell_targets(config: &ProjectConfig) -> Result<Vec<PathBuf>, BuildError> {
    let dir = &config.source_dir;
    let base = config.base_latex_file();
    let entries = fs::read_dir(dir).map_err(|e| BuildError::SourceListing {
        path: dir.clone(),
        source: e,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "tex"))
        .filter(|p| p.file_name().is_some_and(|n| n.to_string_lossy() != base))
        .collect();
    files.sort();
    Ok(files)
}

/// Run ispell interactively over each content file.
pub async fn check(
    config: &ProjectConfig,
    toolchain: &dyn Toolchain,
    reporter: &dyn Reporter,
) -> Result<usize, BuildError> {
    let executable = &config.tools.ispell;
    let program = toolchain
        .resolve(executable)
        .ok_or_else(|| BuildError::ToolUnavailable {
            executable: executable.clone(),
        })?;
    let dictionary = config.spell_dictionary().to_string_lossy().into_owned();
    let files = spell_targets(config)?;
    for file in &files {
        info!(file = %file.display(), "[SPELL] Checking");
        let args = vec![
            "-t".to_string(),
            "-x".to_string(),
            "-p".to_string(),
            dictionary.clone(),
            file.to_string_lossy().into_owned(),
        ];
        if !toolchain
            .interactive(&program, &args, &config.source_dir)
            .await?
        {
            reporter.error(&format!("{executable} failed on {}", file.display()));
        }
    }
    reporter.notice(&format!(
        "Spell check completed for {} file(s) in {}",
        files.len(),
        config.source_dir.display()
    ));
    Ok(files.len())
}
