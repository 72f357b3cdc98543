//! Shared plumbing for subcommands: locating the project, planning the
//! target, rendering diagnostics.

use std::path::PathBuf;
use std::sync::Once;

use kiln_config::{find_project_root, ConfigError};
use kiln_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer, Verbosity};
use kiln_engine::{BuildPlan, EngineError};

use crate::GlobalArgs;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, if it is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Resolves the project root from `--config` or by searching upward from
/// the current directory.
///
/// `--config` may name `kiln.toml` itself or the directory holding it.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, ConfigError> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| dir.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads `kiln.toml` and plans the selected target.
pub fn load_plan(global: &GlobalArgs, target: Option<&str>) -> Result<BuildPlan, EngineError> {
    let root = resolve_project_root(global)?;
    tracing::debug!(root = %root.display(), "project root");
    BuildPlan::load(&root, target)
}

/// A sink whose verbosity follows `-q` and `-v`.
pub fn sink(global: &GlobalArgs) -> DiagnosticSink {
    let verbosity = if global.quiet {
        Verbosity::Quiet
    } else if global.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    DiagnosticSink::with_verbosity(verbosity)
}

/// Prints and drains the diagnostics the sink's verbosity lets through.
/// Returns how many were printed.
pub fn render_diagnostics(sink: &DiagnosticSink, color: bool) -> usize {
    let diagnostics = sink.take_visible();
    let renderer = TerminalRenderer::new(color);
    for diag in &diagnostics {
        eprint!("{}", renderer.render(diag));
    }
    diagnostics.len()
}
