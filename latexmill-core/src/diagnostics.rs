//! Classification of raw toolchain output into warnings, errors and the
//! special conditions the convergence engine acts on.
//!
//! Everything here is pure: the same output always yields the same
//! [`Diagnostics`].

use std::sync::LazyLock;

use regex::Regex;

static LATEX_WARNING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Overfull|Underfull|No file|Package \w+ Warning:)").expect("valid regex")
});
static BIBTEX_WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^I (found no|couldn't open)").expect("valid regex"));
static MISSING_AUX_OR_TOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^No file .+\.(aux|toc)\b").expect("valid regex"));
static MISSING_BBL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^No file .+\.bbl\b").expect("valid regex"));

const UNDEFINED_CITATIONS: &str = "There were undefined citations";

/// Which external tool produced a piece of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// The text compiler (`latex`).
    TextCompiler,
    /// The bibliography compiler (`bibtex`).
    BibliographyCompiler,
    /// Intermediate to postscript (`dvips`).
    PostscriptConversion,
    /// Postscript to pdf (`ps2pdf`).
    PdfConversion,
}

impl ToolKind {
    /// Conversion tools are relayed but never inspected.
    pub fn is_conversion(self) -> bool {
        matches!(
            self,
            ToolKind::PostscriptConversion | ToolKind::PdfConversion
        )
    }
}

/// Conditions derived from a pass that drive re-run decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialConditions {
    /// A `No file` warning named an `.aux` or `.toc` file.
    pub missing_aux_or_toc: bool,
    /// A `No file` warning named a `.bbl` file.
    pub missing_bibliography_output: bool,
    /// The output mentioned undefined citations.
    pub undefined_citations: bool,
}

/// Structured view of one tool run's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub conditions: SpecialConditions,
}

/// How an error block opened by a `!` line is cut out of the output.
///
/// Real latex error blocks vary in length; the window is fixed per strategy
/// so it can be swapped without touching the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBlockStrategy {
    /// The marker line plus `trailing` following lines, joined by newlines.
    /// Near the end of output whatever remains is taken.
    FixedWindow { trailing: usize },
}

impl Default for ErrorBlockStrategy {
    fn default() -> Self {
        ErrorBlockStrategy::FixedWindow { trailing: 3 }
    }
}

impl ErrorBlockStrategy {
    fn extract(self, lines: &[&str]) -> Vec<String> {
        match self {
            ErrorBlockStrategy::FixedWindow { trailing } => {
                let mut errors = Vec::new();
                let mut i = 0;
                while i < lines.len() {
                    if lines[i].starts_with('!') {
                        let end = (i + 1 + trailing).min(lines.len());
                        errors.push(lines[i..end].join("\n"));
                        i = end;
                    } else {
                        i += 1;
                    }
                }
                errors
            }
        }
    }
}

/// Classify with the default error window.
pub fn classify(kind: ToolKind, raw: &str) -> Diagnostics {
    classify_with(kind, raw, ErrorBlockStrategy::default())
}

/// Classify raw output produced by a tool of the given kind.
pub fn classify_with(kind: ToolKind, raw: &str, strategy: ErrorBlockStrategy) -> Diagnostics {
    let lines: Vec<&str> = raw.lines().collect();
    match kind {
        ToolKind::TextCompiler => {
            let warnings: Vec<String> = lines
                .iter()
                .filter(|l| LATEX_WARNING.is_match(l))
                .map(|l| l.to_string())
                .collect();
            let conditions = SpecialConditions {
                missing_aux_or_toc: warnings.iter().any(|w| MISSING_AUX_OR_TOC.is_match(w)),
                missing_bibliography_output: warnings.iter().any(|w| MISSING_BBL.is_match(w)),
                undefined_citations: raw.contains(UNDEFINED_CITATIONS),
            };
            Diagnostics {
                warnings,
                errors: strategy.extract(&lines),
                conditions,
            }
        }
        ToolKind::BibliographyCompiler => Diagnostics {
            warnings: lines
                .iter()
                .filter(|l| BIBTEX_WARNING.is_match(l))
                .map(|l| l.to_string())
                .collect(),
            ..Diagnostics::default()
        },
        ToolKind::PostscriptConversion | ToolKind::PdfConversion => Diagnostics::default(),
    }
}
