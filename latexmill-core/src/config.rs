use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::request::{BuildRequest, OutputFormat};
use crate::scm::RevisionInfo;

/// Project settings. Built once at start-up and passed by reference into
/// every component that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub root_dir: PathBuf,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub distribution_dir: PathBuf,
    pub template_file: PathBuf,
    pub vendor_dir: PathBuf,
    pub graphics_dir: PathBuf,
    pub spell_dir: PathBuf,
    pub spell_file: String,
    /// Base document name without `.tex`.
    pub base_file: String,
    /// Overrides the derived distribution file name prefix.
    pub distribution_name: Option<String>,
    /// `.bib` file for projects without a `document` section. When absent the
    /// first `*.bib` in the source dir is used.
    pub bibliography: Option<String>,
    /// Source control provider name; detected from the root dir when absent.
    pub scm: Option<String>,
    pub tools: ToolNames,
    pub viewers: ViewerNames,
    pub document: Option<DocumentConfig>,
    /// Filled in by the loader, never read from YAML.
    #[serde(skip)]
    pub revision: Option<RevisionInfo>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            source_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("tmp"),
            distribution_dir: PathBuf::from("dist"),
            template_file: PathBuf::from("template.tex"),
            vendor_dir: PathBuf::from("src/vendor"),
            graphics_dir: PathBuf::from("src/graphics"),
            spell_dir: PathBuf::from("src"),
            spell_file: "dictionary.ispell".to_string(),
            base_file: "base".to_string(),
            distribution_name: None,
            bibliography: None,
            scm: None,
            tools: ToolNames::default(),
            viewers: ViewerNames::default(),
            document: None,
            revision: None,
        }
    }
}

impl ProjectConfig {
    /// Make every relative directory absolute against `root_dir`.
    pub fn resolve_paths(mut self) -> Self {
        let root = self.root_dir.clone();
        for dir in [
            &mut self.source_dir,
            &mut self.build_dir,
            &mut self.distribution_dir,
            &mut self.template_file,
            &mut self.vendor_dir,
            &mut self.graphics_dir,
            &mut self.spell_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
        self
    }

    pub fn base_latex_file(&self) -> String {
        format!("{}.tex", self.base_file)
    }

    pub fn spell_dictionary(&self) -> PathBuf {
        self.spell_dir.join(&self.spell_file)
    }

    /// Declared content: main matter, appendices and the bibliography
    /// source, in that order.
    pub fn declared_sources(&self) -> Vec<String> {
        match &self.document {
            Some(doc) => doc.source_files(),
            None => Vec::new(),
        }
    }

    pub fn build_request(&self, format: OutputFormat) -> BuildRequest {
        let mut request =
            BuildRequest::new(&self.base_file, format).with_content(self.declared_sources());
        if let Some(bib) = self.bibliography_source() {
            request = request.with_bibliography(bib);
        }
        request
    }

    /// The declared bibliography: from the `document` section if there is
    /// one, else the top-level key, else a `*.bib` found in the source dir.
    pub fn bibliography_source(&self) -> Option<String> {
        if let Some(doc) = &self.document {
            return doc.bibliography.as_ref().map(Bibliography::source_file);
        }
        if let Some(bib) = &self.bibliography {
            return Some(if bib.ends_with(".bib") {
                bib.clone()
            } else {
                format!("{bib}.bib")
            });
        }
        let mut found: Vec<String> = fs::read_dir(&self.source_dir)
            .ok()?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "bib"))
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        found.sort();
        let first = found.into_iter().next();
        if let Some(bib) = &first {
            debug!(bibliography = %bib, "Detected bibliography in source dir");
        }
        first
    }

    pub fn trace_loaded(&self) {
        info!(
            root_dir = %self.root_dir.display(),
            base_file = %self.base_file,
            declared_sources = self.declared_sources().len(),
            "Loaded ProjectConfig"
        );
        debug!(?self, "ProjectConfig loaded (full debug)");
    }
}

/// Executable names for each external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolNames {
    pub latex: String,
    pub bibtex: String,
    pub dvips: String,
    pub ps2pdf: String,
    pub ispell: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            latex: "latex".to_string(),
            bibtex: "bibtex".to_string(),
            dvips: "dvips".to_string(),
            ps2pdf: "ps2pdf".to_string(),
            ispell: "ispell".to_string(),
        }
    }
}

/// Viewer candidates per format, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerNames {
    pub dvi: Vec<String>,
    pub ps: Vec<String>,
    pub pdf: Vec<String>,
}

impl Default for ViewerNames {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            dvi: names(&["evince", "xdvi", "kdvi"]),
            ps: names(&["evince", "gv"]),
            pdf: names(&["evince", "acroread", "xpdf", "gv"]),
        }
    }
}

impl ViewerNames {
    pub fn for_format(&self, format: OutputFormat) -> &[String] {
        match format {
            OutputFormat::Dvi => &self.dvi,
            OutputFormat::Ps => &self.ps,
            OutputFormat::Pdf => &self.pdf,
        }
    }
}

/// Declarative description of the base document, rendered into the preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub class: DocumentClass,
    pub packages: Vec<Package>,
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub author: Option<Author>,
    pub date: Option<String>,
    pub preamble_extras: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub acknowledgments: Option<String>,
    pub table_of_contents: bool,
    pub list_of_figures: bool,
    pub list_of_tables: bool,
    /// Chapter files without the `.tex` suffix.
    pub main_content: Vec<String>,
    pub appendices: Vec<String>,
    pub bibliography: Option<Bibliography>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            class: DocumentClass::default(),
            packages: Vec::new(),
            title: None,
            sub_title: None,
            author: None,
            date: None,
            preamble_extras: None,
            summary: None,
            acknowledgments: None,
            table_of_contents: false,
            list_of_figures: false,
            list_of_tables: false,
            main_content: Vec::new(),
            appendices: Vec::new(),
            bibliography: None,
        }
    }
}

impl DocumentConfig {
    pub fn source_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .main_content
            .iter()
            .chain(&self.appendices)
            .map(|name| format!("{name}.tex"))
            .collect();
        if let Some(bib) = &self.bibliography {
            files.push(bib.source_file());
        }
        files
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentClass {
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Default for DocumentClass {
    fn default() -> Self {
        Self {
            name: "book".to_string(),
            options: vec!["12pt".to_string(), "twoside".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `file` is the `.bib` name without suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bibliography {
    pub file: String,
    #[serde(default = "default_bibliography_style")]
    pub style: String,
}

fn default_bibliography_style() -> String {
    "plain".to_string()
}

impl Bibliography {
    pub fn source_file(&self) -> String {
        format!("{}.bib", self.file)
    }
}

/// Directory name of `path`, used as the default document identity.
pub fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
