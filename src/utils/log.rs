// src/utils/log.rs

//! Injectable logging seam.
//!
//! The fetcher and the merge engine take a `&dyn Logger` instead of calling
//! the global `log` macros directly, so callers (and tests) decide where
//! diagnostics go. `StdLogger` forwards to the `log` crate; `NopLogger` is
//! the acceptable default when no sink is wanted.

use std::sync::Mutex;

/// Severity of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

/// Minimal diagnostic sink: `info` and `warn` only.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards to the `log` crate macros.
#[derive(Debug, Default)]
pub struct StdLogger;

impl Logger for StdLogger {
    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Records entries in memory so tests can assert on log calls.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, in call order.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Recorded messages at the given level.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((Level::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((Level::Warn, message.to_string()));
    }
}
