//! Preamble assembly: renders the base latex document from a
//! [`DocumentConfig`] by filling `{{PLACEHOLDER}}` markers in a template.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::{DocumentConfig, ProjectConfig};
use crate::error::BuildError;
use crate::scm::RevisionInfo;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").expect("valid regex"));

pub fn default_template() -> &'static str {
    r#"\documentclass{{DOCUMENT_CLASS}}
{{PACKAGES}}
{{PREAMBLE_EXTRAS}}
{{TITLE_BLOCK}}
\begin{document}
{{FRONT_MATTER}}
{{MAIN_CONTENT}}
{{APPENDICES}}
{{BIBLIOGRAPHY}}
\end{document}
"#
}

fn options(opts: &[String]) -> String {
    if opts.is_empty() {
        String::new()
    } else {
        format!("[{}]", opts.join(","))
    }
}

fn includes(files: &[String]) -> String {
    files
        .iter()
        .map(|f| format!("\\include{{{f}}}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn title_block(doc: &DocumentConfig, revision: Option<&RevisionInfo>) -> String {
    let Some(title) = &doc.title else {
        return String::new();
    };
    let mut out = match &doc.sub_title {
        Some(sub) => format!("\\title{{{title}\\\\ \\large {sub}}}\n"),
        None => format!("\\title{{{title}}}\n"),
    };
    if let Some(author) = &doc.author {
        match &author.email {
            Some(email) => out.push_str(&format!(
                "\\author{{{}\\\\ \\texttt{{{email}}}}}\n",
                author.name
            )),
            None => out.push_str(&format!("\\author{{{}}}\n", author.name)),
        }
    }
    let date = doc.date.clone().unwrap_or_else(|| "\\today".to_string());
    match revision {
        Some(rev) => out.push_str(&format!(
            "\\date{{{date}\\\\ \\small {} revision {} ({})}}",
            rev.name, rev.revision, rev.date
        )),
        None => out.push_str(&format!("\\date{{{date}}}")),
    }
    out
}

fn front_matter(doc: &DocumentConfig) -> String {
    let mut parts = Vec::new();
    if doc.title.is_some() {
        parts.push("\\maketitle".to_string());
    }
    if let Some(summary) = &doc.summary {
        parts.push(format!("\\begin{{abstract}}\n{summary}\n\\end{{abstract}}"));
    }
    if let Some(ack) = &doc.acknowledgments {
        parts.push(format!("\\section*{{Acknowledgments}}\n{ack}"));
    }
    if doc.table_of_contents {
        parts.push("\\tableofcontents".to_string());
    }
    if doc.list_of_figures {
        parts.push("\\listoffigures".to_string());
    }
    if doc.list_of_tables {
        parts.push("\\listoftables".to_string());
    }
    parts.join("\n")
}

/// Values for every placeholder the renderer knows.
pub fn placeholders(
    doc: &DocumentConfig,
    revision: Option<&RevisionInfo>,
) -> BTreeMap<&'static str, String> {
    let mut values = BTreeMap::new();
    values.insert(
        "DOCUMENT_CLASS",
        format!("{}{{{}}}", options(&doc.class.options), doc.class.name),
    );
    values.insert(
        "PACKAGES",
        doc.packages
            .iter()
            .map(|p| format!("\\usepackage{}{{{}}}", options(&p.options), p.name))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    values.insert(
        "PREAMBLE_EXTRAS",
        doc.preamble_extras.clone().unwrap_or_default(),
    );
    values.insert("TITLE_BLOCK", title_block(doc, revision));
    values.insert("FRONT_MATTER", front_matter(doc));
    values.insert("MAIN_CONTENT", includes(&doc.main_content));
    values.insert(
        "APPENDICES",
        if doc.appendices.is_empty() {
            String::new()
        } else {
            format!("\\appendix\n{}", includes(&doc.appendices))
        },
    );
    values.insert(
        "BIBLIOGRAPHY",
        doc.bibliography
            .as_ref()
            .map(|b| format!("\\bibliographystyle{{{}}}\n\\bibliography{{{}}}", b.style, b.file))
            .unwrap_or_default(),
    );
    values.insert(
        "REVISION",
        revision.map(|r| r.revision.clone()).unwrap_or_default(),
    );
    values
}

/// Substitute every `{{NAME}}` in `template`. Unknown names are an error.
pub fn render(
    template: &str,
    doc: &DocumentConfig,
    revision: Option<&RevisionInfo>,
) -> Result<String, BuildError> {
    let values = placeholders(doc, revision);
    if let Some(unknown) = PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1))
        .find(|m| !values.contains_key(m.as_str()))
    {
        return Err(BuildError::Template(format!(
            "unknown placeholder {{{{{}}}}}",
            unknown.as_str()
        )));
    }
    let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| {
        values.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

/// Render the base document into `target_dir` from the configured template
/// file, falling back to [`default_template`] when no file exists.
pub fn write_base_document(
    config: &ProjectConfig,
    doc: &DocumentConfig,
    target_dir: &Path,
) -> Result<(), BuildError> {
    let template = if config.template_file.is_file() {
        debug!(path = %config.template_file.display(), "[TEMPLATE] Using template file");
        fs::read_to_string(&config.template_file).map_err(|e| {
            BuildError::Template(format!(
                "failed to read {}: {e}",
                config.template_file.display()
            ))
        })?
    } else {
        debug!("[TEMPLATE] Using built-in template");
        default_template().to_string()
    };
    let rendered = render(&template, doc, config.revision.as_ref())?;
    let path = target_dir.join(config.base_latex_file());
    fs::write(&path, rendered).map_err(|e| BuildError::Staging {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), "[TEMPLATE] Base document written");
    Ok(())
}
