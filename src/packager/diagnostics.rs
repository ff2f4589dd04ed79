//! Shared diagnostic sink for authoring and build problems.
//!
//! Non-fatal problems (unresolvable media references, duplicate archive
//! names, failed archive builds) are reported here instead of aborting, so
//! every sibling problem in the same pass still surfaces. The sink is shared
//! between the orchestrator and the worker pool and is safe for concurrent
//! writes.

use super::error::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Non-fatal; packaging continues and succeeds
    Warning,
    /// Fatal for the pass; packaging continues best-effort, then aborts at
    /// the next phase boundary
    Error,
}

/// One reported problem.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity of the problem
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
}

/// Thread-safe collector of warnings and errors.
///
/// Cloning is cheap and shares the underlying buffer, so the same sink can be
/// handed to the partitioner, the cache resolver, and every pool worker.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Diagnostics {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and logs it.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.lock().push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    /// Records an error and logs it.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.lock().push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    /// Number of errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Number of warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Fails with [`Error::ErrorsReported`] if any error has been recorded.
    ///
    /// Phase boundaries call this to short-circuit once a fatal condition
    /// exists.
    pub fn check(&self) -> Result<()> {
        match self.error_count() {
            0 => Ok(()),
            count => Err(Error::ErrorsReported { count }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // A poisoned sink only means a worker panicked after reporting;
        // the accumulated entries are still meaningful.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
