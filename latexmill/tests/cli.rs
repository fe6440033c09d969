use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const MISSING_CHAPTER_CONFIG: &str = "\
document:
  title: Notes
  main_content:
    - intro
    - method
";

/// A project dir with `config.yml` and the given files under `src/`.
fn project(config: &str, sources: &[&str]) -> TempDir {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join("config.yml"), config).expect("write config");
    fs::create_dir_all(dir.path().join("src")).expect("src dir");
    for name in sources {
        fs::write(dir.path().join("src").join(name), "").expect("write source");
    }
    dir
}

fn latexmill(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("latexmill").expect("Binary exists");
    cmd.current_dir(dir);
    cmd
}

#[test]
fn help_lists_flags_and_exits_with_one() {
    let dir = tempdir().unwrap();
    latexmill(dir.path())
        .arg("--help")
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("--format")
                .and(predicate::str::contains("--view"))
                .and(predicate::str::contains("--spell")),
        );
}

#[test]
fn unknown_format_is_rejected() {
    let dir = tempdir().unwrap();
    latexmill(dir.path())
        .args(["--format", "docx"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn missing_declared_chapter_aborts_build() {
    let dir = project(MISSING_CHAPTER_CONFIG, &["intro.tex"]);
    latexmill(dir.path())
        .args(["--format", "dvi"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Source file:").and(predicate::str::contains("method.tex")));
    // Pre-flight runs before the build dir is prepared.
    assert!(!dir.path().join("tmp").exists());
}

#[test]
fn missing_compiler_is_reported_by_name() {
    let dir = project("", &["base.tex"]);
    let empty_path = tempdir().unwrap();
    latexmill(dir.path())
        .env("PATH", empty_path.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Running of latex aborted"));
}

#[test]
fn spell_without_ispell_fails() {
    let dir = project("", &["intro.tex"]);
    let empty_path = tempdir().unwrap();
    latexmill(dir.path())
        .arg("--spell")
        .env("PATH", empty_path.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("ispell"));
}

#[test]
fn explicit_config_that_does_not_exist_fails() {
    let dir = tempdir().unwrap();
    latexmill(dir.path())
        .args(["--config", "elsewhere.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

use latexmill::cli::{run_with, Cli, Format};
use latexmill_core::contract::MockToolchain;
use latexmill_core::reporter::MemoryReporter;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Collects the debug rendering of every emitted event.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{event:?}"));
    }
}

#[tokio::test]
async fn run_with_traces_start_and_reports_preflight_failure() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = project(MISSING_CHAPTER_CONFIG, &["intro.tex"]);
    let mut toolchain = MockToolchain::new();
    toolchain.expect_resolve().times(0);
    toolchain.expect_capture().times(0);
    let reporter = MemoryReporter::new();
    let cli = Cli {
        format: Format::Pdf,
        view: false,
        spell: false,
        config: Some(dir.path().join("config.yml")),
    };

    let result = run_with(cli, &toolchain, &reporter).await;

    assert!(result.is_err());
    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("method.tex"), "{errors:?}");
    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("cli_started")),
        "Expected a 'cli_started' trace event, got: {:?}",
        event_msgs
    );
}
