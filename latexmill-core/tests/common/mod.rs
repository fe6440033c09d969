#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use latexmill_core::contract::MockToolchain;

/// Executables the scripted toolchain has been asked to run, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Scripted output per tool. Each latex pass pops the next entry; once the
/// queue is empty latex prints nothing.
#[derive(Default, Clone)]
pub struct Script {
    pub latex: Vec<String>,
    pub bibtex: String,
    pub dvips: String,
    pub ps2pdf: String,
}

impl Script {
    pub fn latex<I, S>(passes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            latex: passes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// A toolchain where every executable resolves under `/usr/bin` and
/// `capture` answers from `script`.
pub fn scripted_toolchain(script: Script) -> (MockToolchain, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut toolchain = MockToolchain::new();
    toolchain
        .expect_resolve()
        .returning(|name: &str| Some(PathBuf::from("/usr/bin").join(name)));

    let latex = Arc::new(Mutex::new(VecDeque::from(script.latex.clone())));
    let log = calls.clone();
    toolchain
        .expect_capture()
        .returning(move |program: &Path, _args: &[String], _cwd: &Path| {
            let name = program
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log.lock().unwrap().push(name.clone());
            let out = match name.as_str() {
                "latex" => latex.lock().unwrap().pop_front().unwrap_or_default(),
                "bibtex" => script.bibtex.clone(),
                "dvips" => script.dvips.clone(),
                "ps2pdf" => script.ps2pdf.clone(),
                _ => String::new(),
            };
            Ok(out)
        });
    (toolchain, calls)
}

pub fn calls_to(log: &CallLog, executable: &str) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|c| c.as_str() == executable)
        .count()
}

pub fn touch(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), "").unwrap();
    }
}

/// A staging dir pre-populated with every file the tools read for `base`.
pub fn staged(dir: &Path, base: &str) -> PathBuf {
    let staging = dir.join("tmp");
    let files: Vec<String> = ["tex", "aux", "dvi", "ps", "pdf"]
        .iter()
        .map(|ext| format!("{base}.{ext}"))
        .collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    touch(&staging, &refs);
    staging
}
