use std::fmt;

use serde::{Deserialize, Serialize};

/// Target output of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The text compiler's own output; no conversion stage.
    Dvi,
    Ps,
    #[default]
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Dvi => "dvi",
            OutputFormat::Ps => "ps",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What to build. Read-only for the whole build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Base document name without extension, e.g. `base` for `base.tex`.
    pub base: String,
    /// Content files in declaration order, relative to the source directory.
    pub content: Vec<String>,
    /// Bibliography source (`refs.bib`) if the document cites anything.
    pub bibliography: Option<String>,
    pub format: OutputFormat,
}

impl BuildRequest {
    pub fn new(base: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            base: base.into(),
            content: Vec::new(),
            bibliography: None,
            format,
        }
    }

    pub fn with_content<I, S>(mut self, content: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = content.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bibliography(mut self, bibliography: impl Into<String>) -> Self {
        self.bibliography = Some(bibliography.into());
        self
    }

    pub fn base_file(&self, extension: &str) -> String {
        format!("{}.{}", self.base, extension)
    }

    pub fn latex_file(&self) -> String {
        self.base_file("tex")
    }

    /// bibtex reads the auxiliary file, not the `.bib` source.
    pub fn bibtex_input(&self) -> String {
        self.base_file("aux")
    }

    pub fn artifact_file(&self) -> String {
        self.base_file(self.format.extension())
    }
}
