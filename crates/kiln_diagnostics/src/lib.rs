//! Diagnostic creation, severity management, and terminal rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels
//! and stable codes. A [`DiagnosticSink`] is created per run and passed
//! explicitly into every engine entry point; it records diagnostics and carries
//! the run's [`Verbosity`], so there is no process-wide log level.
//! [`TerminalRenderer`] formats diagnostics for the command line.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{codes, Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::{DiagnosticSink, Verbosity};
