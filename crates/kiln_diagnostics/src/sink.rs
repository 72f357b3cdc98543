//! Run-scoped diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::cell::{Cell, RefCell};

/// How much output a run produces.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Notes, warnings, and errors.
    #[default]
    Normal,
    /// Everything, including per-stage debug detail.
    Verbose,
}

impl Verbosity {
    /// Returns `true` if diagnostics of `severity` should be shown.
    pub fn shows(self, severity: Severity) -> bool {
        match self {
            Verbosity::Quiet => severity >= Severity::Error,
            Verbosity::Normal => severity >= Severity::Note,
            Verbosity::Verbose => true,
        }
    }
}

/// Accumulates diagnostics emitted during one engine run.
///
/// The engine is single-threaded, so the sink uses interior mutability rather
/// than locking. Each run (or test) creates its own sink; nothing is global.
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
    error_count: Cell<usize>,
    verbosity: Verbosity,
}

impl DiagnosticSink {
    /// Creates a new empty sink with [`Verbosity::Normal`].
    pub fn new() -> Self {
        Self::with_verbosity(Verbosity::Normal)
    }

    /// Creates a new empty sink with the given verbosity.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            error_count: Cell::new(0),
            verbosity,
        }
    }

    /// The verbosity this run was started with.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Returns `true` if debug-level diagnostics will be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.error_count.set(self.error_count.get() + 1);
        }
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    ///
    /// The error count is not reset.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Takes the diagnostics the current verbosity shows, discarding the rest.
    pub fn take_visible(&self) -> Vec<Diagnostic> {
        let verbosity = self.verbosity;
        self.take_all()
            .into_iter()
            .filter(|d| verbosity.shows(d.severity))
            .collect()
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
