//! Revision metadata from the project's source control system, stamped into
//! the title page and the distribution file name.

use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::BuildError;

/// Name, revision and date of the latest changeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    pub name: String,
    pub revision: String,
    pub date: String,
}

/// Known source control providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmProvider {
    Mercurial,
    Subversion,
    Git,
}

/// Configuration names accepted for each provider.
const PROVIDERS: &[(&str, ScmProvider)] = &[
    ("mercurial", ScmProvider::Mercurial),
    ("hg", ScmProvider::Mercurial),
    ("subversion", ScmProvider::Subversion),
    ("svn", ScmProvider::Subversion),
    ("git", ScmProvider::Git),
];

static HG_CHANGESET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^changeset: +(.+)$").expect("valid regex"));
static HG_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^date: +(.+)$").expect("valid regex"));
static SVN_REVISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Revision: (\d+)").expect("valid regex"));
static SVN_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Last Changed Date: (.+)$").expect("valid regex"));

impl ScmProvider {
    /// Look up a provider by configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, BuildError> {
        let key = name.trim().to_ascii_lowercase();
        PROVIDERS
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, p)| *p)
            .ok_or_else(|| BuildError::UnknownScmProvider(name.to_string()))
    }

    /// Guess the provider from the metadata directory present in `dir`.
    pub fn detect(dir: &Path) -> Option<Self> {
        [
            (".svn", ScmProvider::Subversion),
            (".hg", ScmProvider::Mercurial),
            (".git", ScmProvider::Git),
        ]
        .into_iter()
        .find(|(marker, _)| dir.join(marker).exists())
        .map(|(_, p)| p)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScmProvider::Mercurial => "Mercurial",
            ScmProvider::Subversion => "Subversion",
            ScmProvider::Git => "Git",
        }
    }

    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            ScmProvider::Mercurial => ("hg", &["tip"]),
            ScmProvider::Subversion => ("svn", &["info"]),
            ScmProvider::Git => ("git", &["log", "-1", "--format=%h%n%cd"]),
        }
    }

    /// Parse the provider's raw status output.
    pub fn parse(self, raw: &str) -> Option<RevisionInfo> {
        let capture = |re: &Regex| {
            re.captures(raw)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
        };
        let (revision, date) = match self {
            ScmProvider::Mercurial => (capture(&HG_CHANGESET)?, capture(&HG_DATE)?),
            ScmProvider::Subversion => (capture(&SVN_REVISION)?, capture(&SVN_DATE)?),
            ScmProvider::Git => {
                let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
                (lines.next()?.to_string(), lines.next()?.to_string())
            }
        };
        Some(RevisionInfo {
            name: self.display_name().to_string(),
            revision,
            date,
        })
    }

    /// Run the provider's status command in `dir` and parse its output.
    /// Returns `None` when the tool is missing or the output is unusable.
    pub fn extract_revision_info(self, dir: &Path) -> Option<RevisionInfo> {
        let (program, args) = self.command();
        let output = match Command::new(program).args(args).current_dir(dir).output() {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                warn!(program, status = ?o.status, "SCM command exited with non-zero code");
                return None;
            }
            Err(e) => {
                debug!(program, error = ?e, "SCM command unavailable");
                return None;
            }
        };
        let info = self.parse(&String::from_utf8_lossy(&output.stdout));
        debug!(program, ?info, "Parsed SCM stats");
        info
    }
}
