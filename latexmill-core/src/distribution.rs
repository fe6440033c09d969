use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{directory_name, ProjectConfig};
use crate::error::BuildError;
use crate::request::OutputFormat;
use crate::scm::RevisionInfo;

/// Lowercase each part, turn spaces into dots, drop `:` and `-`, and join
/// the parts with dots.
pub fn to_file_name<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| {
            p.as_ref()
                .to_lowercase()
                .replace(' ', ".")
                .replace([':', '-'], "")
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// The name of the user running the build, from `USER` or `USERNAME`.
pub fn current_user() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// `<root dir>.<user>[.r<revision>]`, with `:` in the revision replaced by `_`.
pub fn derive_distribution_name(
    root_dir: &Path,
    user: Option<&str>,
    revision: Option<&RevisionInfo>,
) -> String {
    let mut name = directory_name(root_dir);
    if let Some(user) = user {
        name.push('.');
        name.push_str(user);
    }
    if let Some(rev) = revision {
        name.push_str(".r");
        name.push_str(&rev.revision.replace(':', "_"));
    }
    name
}

/// The revision number without any `:hash` suffix (`12:abc123` becomes `12`).
pub fn local_revision(revision: &str) -> &str {
    revision.split(':').next().unwrap_or(revision)
}

/// The configured override; else author and title of the document; else
/// the root directory and user.
pub fn distribution_name(config: &ProjectConfig) -> String {
    if let Some(name) = &config.distribution_name {
        return name.clone();
    }
    let doc = config.document.as_ref();
    match (
        doc.and_then(|d| d.author.as_ref()),
        doc.and_then(|d| d.title.as_ref()),
    ) {
        (Some(author), Some(title)) => {
            let mut parts = vec![author.name.clone(), title.clone()];
            if let Some(rev) = &config.revision {
                parts.push(format!("r{}", local_revision(&rev.revision)));
            }
            to_file_name(&parts)
        }
        _ => derive_distribution_name(
            &config.root_dir,
            current_user().as_deref(),
            config.revision.as_ref(),
        ),
    }
}

pub fn distribution_file(config: &ProjectConfig, format: OutputFormat) -> PathBuf {
    config
        .distribution_dir
        .join(format!("{}.{}", distribution_name(config), format.extension()))
}

/// Copy `artifact` to `destination`, creating the destination directory.
pub fn distribute(artifact: &Path, destination: &Path) -> Result<(), BuildError> {
    if let Some(dir) = destination.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            error!(error = ?e, path = %dir.display(), "[DIST] Failed to create distribution directory");
            BuildError::Distribution {
                path: dir.to_path_buf(),
                source: e,
            }
        })?;
    }
    fs::copy(artifact, destination).map_err(|e| {
        error!(
            error = ?e,
            from = %artifact.display(),
            to = %destination.display(),
            "[DIST] Failed to copy artifact"
        );
        BuildError::Distribution {
            path: artifact.to_path_buf(),
            source: e,
        }
    })?;
    info!(
        from = %artifact.display(),
        to = %destination.display(),
        "[DIST] Artifact distributed"
    );
    Ok(())
}
