use std::sync::Mutex;

use crate::contract::Reporter;

/// Prints to stdout: notices verbatim, warnings as `  - `, errors as `  * `.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn notice(&self, message: &str) {
        println!("{message}");
    }

    fn warning(&self, message: &str) {
        println!("  - {message}");
    }

    fn error(&self, message: &str) {
        println!("  * {message}");
    }
}

/// One relayed line, tagged with its severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Notice(String),
    Warning(String),
    Error(String),
}

/// Keeps every relayed line in order. Useful when output has to be inspected
/// rather than printed.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<Message>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|m| match m {
                Message::Warning(w) => Some(w.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|m| match m {
                Message::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Message>> {
        // A poisoned lock only means another reporter call panicked; the
        // recorded lines are still valid.
        self.messages.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn push(&self, message: Message) {
        self.lock().push(message);
    }
}

impl Reporter for MemoryReporter {
    fn notice(&self, message: &str) {
        self.push(Message::Notice(message.to_owned()));
    }

    fn warning(&self, message: &str) {
        self.push(Message::Warning(message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.push(Message::Error(message.to_owned()));
    }
}
