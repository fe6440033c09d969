/// `load_config` module: reads the project's YAML configuration and resolves it into a
/// ready-to-use [`ProjectConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file; every key is optional and falls back to defaults
/// - Anchor relative directories at the project root (the config file's directory)
/// - Select the source control provider (configured name or detection) and stamp revision info
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.
///
/// A missing `config.yml` in the working directory is not an error: the defaults describe a
/// plain `src/base.tex` project. An explicitly requested file that does not exist is.
use anyhow::{Context, Result};
use latexmill_core::config::ProjectConfig;
use latexmill_core::scm::ScmProvider;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Loads the configuration at `path`, or `config.yml` in the current directory when `None`.
pub fn load_config(path: Option<&Path>) -> Result<ProjectConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let (path_ref, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (cwd.join(DEFAULT_CONFIG_FILE), false),
    };
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config = if path_ref.exists() {
        let config_content = match fs::read_to_string(&path_ref) {
            Ok(content) => {
                info!(config_path = ?path_ref, "Config file read successfully");
                content
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
                return Err(anyhow::anyhow!(
                    "Failed to read config file {:?}: {}",
                    path_ref,
                    e
                ));
            }
        };
        parse_config(&config_content)?
    } else if explicit {
        error!(config_path = ?path_ref, "Config file not found");
        return Err(anyhow::anyhow!("Config file {:?} not found", path_ref));
    } else {
        info!(config_path = ?path_ref, "No config file, using defaults");
        ProjectConfig::default()
    };

    let base = path_ref
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or(cwd);
    let base = base.canonicalize().unwrap_or(base);
    let config = resolve(config, &base)?;
    config.trace_loaded();
    Ok(config)
}

/// Parses YAML text into an unresolved [`ProjectConfig`]. An empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<ProjectConfig> {
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    match serde_yaml::from_str::<ProjectConfig>(content) {
        Ok(conf) => {
            info!("Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Anchors the root at `base`, makes directories absolute and attaches revision info.
pub fn resolve(mut config: ProjectConfig, base: &Path) -> Result<ProjectConfig> {
    config.root_dir = root_dir(&config.root_dir, base);
    let mut config = config.resolve_paths();

    let provider = match &config.scm {
        Some(name) => Some(ScmProvider::from_name(name)?),
        None => ScmProvider::detect(&config.root_dir),
    };
    config.revision = provider.and_then(|p| p.extract_revision_info(&config.root_dir));
    if let Some(rev) = &config.revision {
        info!(scm = %rev.name, revision = %rev.revision, "Source control revision found");
    }
    Ok(config)
}

fn root_dir(configured: &Path, base: &Path) -> PathBuf {
    if configured == Path::new(".") || configured.as_os_str().is_empty() {
        base.to_path_buf()
    } else if configured.is_relative() {
        base.join(configured)
    } else {
        configured.to_path_buf()
    }
}
