//! Diagnostic rendering for the terminal.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Errors and warnings produce output like:
/// ```text
/// error[E201]: failed to compile src/a.c
///   --> src/a.c
///    = note: a.c:3:1: error: expected ';'
/// ```
/// Notes and debug lines are rendered as a single indented status line.
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match severity {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
            Severity::Note => "1;32",
            Severity::Debug => "2",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        match diag.severity {
            Severity::Note | Severity::Debug => {
                out.push_str(&format!(
                    "{:>12} {}\n",
                    self.paint(diag.severity, &diag.severity.to_string()),
                    diag.message
                ));
            }
            Severity::Warning | Severity::Error => {
                let header = format!("{}[{}]", diag.severity, diag.code);
                out.push_str(&format!(
                    "{}: {}\n",
                    self.paint(diag.severity, &header),
                    diag.message
                ));
                if let Some(path) = &diag.path {
                    out.push_str(&format!("  --> {}\n", path.display()));
                }
            }
        }

        for note in &diag.notes {
            for line in note.lines() {
                out.push_str(&format!("   = note: {line}\n"));
            }
        }

        out
    }
}
