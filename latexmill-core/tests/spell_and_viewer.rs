use latexmill_core::config::ProjectConfig;
use latexmill_core::contract::MockToolchain;
use latexmill_core::error::BuildError;
use latexmill_core::reporter::MemoryReporter;
use latexmill_core::request::OutputFormat;
use latexmill_core::spell::{self, spell_targets};
use latexmill_core::viewer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn project(root: &Path) -> ProjectConfig {
    let config = ProjectConfig {
        root_dir: root.to_path_buf(),
        distribution_name: Some("thesis".to_string()),
        ..ProjectConfig::default()
    }
    .resolve_paths();
    fs::create_dir_all(&config.source_dir).unwrap();
    for name in ["base.tex", "intro.tex", "appendix.tex", "refs.bib"] {
        fs::write(config.source_dir.join(name), "").unwrap();
    }
    config
}

#[test]
fn spell_targets_skip_base_document() {
    let dir = tempdir().unwrap();
    let config = project(dir.path());

    let targets = spell_targets(&config).expect("listed");

    assert_eq!(
        targets,
        vec![
            config.source_dir.join("appendix.tex"),
            config.source_dir.join("intro.tex"),
        ]
    );
}

#[tokio::test]
async fn spell_check_runs_ispell_per_file_with_dictionary() {
    let dir = tempdir().unwrap();
    let config = project(dir.path());
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let mut toolchain = MockToolchain::new();
    toolchain
        .expect_resolve()
        .withf(|name: &str| name == "ispell")
        .returning(|_| Some(PathBuf::from("/usr/bin/ispell")));
    toolchain
        .expect_interactive()
        .times(2)
        .returning(move |_, args: &[String], _| {
            log.lock().unwrap().push(args.to_vec());
            Ok(true)
        });
    let reporter = MemoryReporter::new();

    let checked = spell::check(&config, &toolchain, &reporter).await.expect("ran");

    assert_eq!(checked, 2);
    let dictionary = config.spell_dictionary().to_string_lossy().into_owned();
    let calls = seen.lock().unwrap();
    assert_eq!(calls[0][..4], ["-t", "-x", "-p", dictionary.as_str()]);
    assert!(calls[0][4].ends_with("appendix.tex"));
    assert!(calls[1][4].ends_with("intro.tex"));
    assert!(reporter.errors().is_empty());
}

#[tokio::test]
async fn spell_check_without_ispell_fails() {
    let dir = tempdir().unwrap();
    let config = project(dir.path());
    let mut toolchain = MockToolchain::new();
    toolchain.expect_resolve().returning(|_| None);
    toolchain.expect_interactive().times(0);
    let reporter = MemoryReporter::new();

    let err = spell::check(&config, &toolchain, &reporter).await.unwrap_err();

    assert!(matches!(err, BuildError::ToolUnavailable { ref executable } if executable == "ispell"));
}

#[tokio::test]
async fn viewer_uses_first_available_candidate() {
    let dir = tempdir().unwrap();
    let config = project(dir.path());
    let mut toolchain = MockToolchain::new();
    toolchain.expect_resolve().returning(|name: &str| {
        (name == "xpdf").then(|| PathBuf::from("/usr/bin/xpdf"))
    });
    let expected = config
        .distribution_dir
        .join("thesis.pdf")
        .to_string_lossy()
        .into_owned();
    toolchain
        .expect_interactive()
        .withf(move |program: &Path, args: &[String], _cwd: &Path| {
            program == Path::new("/usr/bin/xpdf") && args == [expected.clone()]
        })
        .times(1)
        .returning(|_, _, _| Ok(true));
    let reporter = MemoryReporter::new();

    viewer::view(&config, OutputFormat::Pdf, &toolchain, &reporter)
        .await
        .expect("viewed");

    assert!(reporter.errors().is_empty());
}

#[tokio::test]
async fn viewer_lists_candidates_when_none_found() {
    let dir = tempdir().unwrap();
    let config = project(dir.path());
    let mut toolchain = MockToolchain::new();
    toolchain.expect_resolve().returning(|_| None);
    toolchain.expect_interactive().times(0);
    let reporter = MemoryReporter::new();

    let err = viewer::view(&config, OutputFormat::Ps, &toolchain, &reporter)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("evince, gv"), "{err}");
}

#[test]
fn unreadable_source_dir_is_reported_as_such() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig {
        root_dir: dir.path().to_path_buf(),
        ..ProjectConfig::default()
    }
    .resolve_paths();

    let err = spell_targets(&config).unwrap_err();

    assert!(matches!(err, BuildError::SourceListing { ref path, .. } if path == &config.source_dir));
    assert!(err.to_string().starts_with("Failed to read source directory"), "{err}");
}
