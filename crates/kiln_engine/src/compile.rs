//! Stage 5: compile changed translation units and read their symbols.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_index::{symbol_set, FileIdx, FileTree};
use kiln_toolchain::{CompileJob, ToolOutput, Toolchain};

use crate::error::EngineError;
use crate::plan::BuildPlan;

/// Files compiled and files that failed, relative to the project root.
#[derive(Debug, Default)]
pub(crate) struct CompileSummary {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// The compile invocation for one translation unit.
pub(crate) fn compile_job(plan: &BuildPlan, tree: &FileTree, idx: FileIdx) -> CompileJob {
    let file = tree.get(idx);
    let config = &tree.config(idx).resolved;
    CompileJob {
        compiler: config.compiler.clone(),
        flags: config.compiler_flags.flags().to_vec(),
        source: file.path.clone(),
        object: plan.object_path(file.id),
    }
}

/// Compiles every file in `units`, continuing past failures.
///
/// A unit that compiles gets fresh symbol sets; a unit that fails has its
/// symbols cleared and its object removed so the next run retries it.
pub(crate) fn compile_all<T: Toolchain>(
    plan: &BuildPlan,
    tree: &mut FileTree,
    units: &[FileIdx],
    toolchain: &mut T,
    sink: &DiagnosticSink,
) -> Result<CompileSummary, EngineError> {
    let mut summary = CompileSummary::default();
    if units.is_empty() {
        return Ok(summary);
    }
    fs::create_dir_all(&plan.object_dir).map_err(EngineError::io(&plan.object_dir))?;

    for &idx in units {
        let rel = tree.get(idx).rel.clone();
        if compile_one(plan, tree, idx, toolchain, sink)? {
            summary.compiled.push(rel);
        } else {
            tree.get_mut(idx).role.clear_symbols();
            summary.failed.push(rel);
        }
    }
    tracing::debug!(
        compiled = summary.compiled.len(),
        failed = summary.failed.len(),
        "compiled translation units"
    );
    Ok(summary)
}

fn compile_one<T: Toolchain>(
    plan: &BuildPlan,
    tree: &mut FileTree,
    idx: FileIdx,
    toolchain: &mut T,
    sink: &DiagnosticSink,
) -> Result<bool, EngineError> {
    let rel = tree.get(idx).rel.clone();
    if let Some(owner) = &tree.config(idx).poisoned {
        sink.emit(
            Diagnostic::error(
                codes::COMPILE_FAILED,
                format!("cannot compile {}", rel.display()),
            )
            .with_path(&rel)
            .with_note(format!("configuration of {} is invalid", owner.display())),
        );
        return Ok(false);
    }

    let job = compile_job(plan, tree, idx);
    remove_stale(&job.object)?;
    sink.emit(Diagnostic::note(
        codes::COMPILING,
        format!("compiling {}", rel.display()),
    ));
    tracing::debug!(source = %job.source.display(), object = %job.object.display(), "compile");

    let output = match toolchain.compile(&job) {
        Ok(output) => output,
        Err(err) => {
            sink.emit(
                Diagnostic::error(
                    codes::COMPILE_FAILED,
                    format!("cannot compile {}", rel.display()),
                )
                .with_path(&rel)
                .with_note(err.to_string()),
            );
            return Ok(false);
        }
    };
    if !output.is_success() {
        sink.emit(tool_failure(
            Diagnostic::error(
                codes::COMPILE_FAILED,
                format!("{} failed to compile ({})", rel.display(), output.status()),
            )
            .with_path(&rel),
            &output,
        ));
        remove_stale(&job.object)?;
        return Ok(false);
    }

    match toolchain.read_symbols(&job.object) {
        Ok(symbols) => {
            tree.get_mut(idx)
                .role
                .set_symbols(symbol_set(symbols.defined), symbol_set(symbols.undefined));
            Ok(true)
        }
        Err(err) => {
            sink.emit(
                Diagnostic::error(
                    codes::SYMBOLS_FAILED,
                    format!("cannot read symbols of {}", rel.display()),
                )
                .with_path(&rel)
                .with_note(err.to_string()),
            );
            Ok(false)
        }
    }
}

/// Attaches a failed tool's captured output to `diag`, one note per line.
pub(crate) fn tool_failure(mut diag: Diagnostic, output: &ToolOutput) -> Diagnostic {
    for line in output.stdout.lines().chain(output.stderr.lines()) {
        if !line.trim().is_empty() {
            diag = diag.with_note(line);
        }
    }
    diag
}

/// Deletes an artifact about to be rebuilt. A missing file is fine.
pub(crate) fn remove_stale(path: &Path) -> Result<(), EngineError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(EngineError::io(path)(err)),
    }
}
