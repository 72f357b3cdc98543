//! Stage 6: collect the link set from the symbol graph and link it.

use std::fs;
use std::path::{Path, PathBuf};

use kiln_common::{key_hash, FileId, KilnResult};
use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_graph::{Graph, UnresolvedSymbol};
use kiln_index::FileTree;
use kiln_table::KeySet;
use kiln_toolchain::{LinkJob, Toolchain};

use crate::compile::{remove_stale, tool_failure};
use crate::error::EngineError;
use crate::plan::BuildPlan;

/// The link invocation for everything reachable from `root` in the symbol graph.
///
/// Objects are ordered by a depth-first walk from `root`, so `root` comes
/// first. The target's base linker flags are passed unchanged, followed by
/// each object's own linker flags in link order, skipping any flag already
/// on the command line.
pub(crate) fn link_job(
    plan: &BuildPlan,
    tree: &FileTree,
    symbols: &Graph,
    root: FileId,
    output: PathBuf,
) -> KilnResult<LinkJob> {
    let mut flags = plan.target.linker.flags.clone();
    let mut seen = KeySet::new();
    for flag in &flags {
        seen.insert(key_hash(flag.as_bytes()));
    }

    let mut objects = Vec::new();
    for id in symbols.walk([root])? {
        let idx = tree.require(id)?;
        objects.push(plan.object_path(id));
        for flag in tree.config(idx).resolved.linker_flags.flags() {
            if !seen.insert(key_hash(flag.as_bytes())) {
                flags.push(flag.clone());
            }
        }
    }

    Ok(LinkJob {
        linker: plan.target.linker.name.clone(),
        flags,
        objects,
        output,
    })
}

/// Runs `job`, replacing any previous executable. Returns `true` on success.
pub(crate) fn run_link<T: Toolchain>(
    job: &LinkJob,
    toolchain: &mut T,
    sink: &DiagnosticSink,
) -> Result<bool, EngineError> {
    if let Some(dir) = job.output.parent() {
        fs::create_dir_all(dir).map_err(EngineError::io(dir))?;
    }
    remove_stale(&job.output)?;
    let name = display_name(&job.output);
    sink.emit(Diagnostic::note(codes::LINKING, format!("linking {name}")));
    tracing::debug!(output = %job.output.display(), objects = job.objects.len(), "link");

    match toolchain.link(job) {
        Ok(output) if output.is_success() => Ok(true),
        Ok(output) => {
            sink.emit(tool_failure(
                Diagnostic::error(
                    codes::LINK_FAILED,
                    format!("linking {name} failed ({})", output.status()),
                )
                .with_path(&job.output),
                &output,
            ));
            Ok(false)
        }
        Err(err) => {
            sink.emit(
                Diagnostic::error(codes::LINK_FAILED, format!("cannot link {name}"))
                    .with_path(&job.output)
                    .with_note(err.to_string()),
            );
            Ok(false)
        }
    }
}

/// Notes, for each linked file, the symbols it references that no indexed
/// file defines. Called after a failed link.
pub(crate) fn note_unresolved(
    plan: &BuildPlan,
    tree: &FileTree,
    job: &LinkJob,
    unresolved: &[UnresolvedSymbol],
    sink: &DiagnosticSink,
) -> KilnResult<()> {
    let mut by_consumer: Vec<(FileId, Vec<&str>)> = Vec::new();
    for missing in unresolved {
        if !job.objects.contains(&plan.object_path(missing.consumer)) {
            continue;
        }
        if let Some((id, names)) = by_consumer.last_mut() {
            if *id == missing.consumer {
                names.push(missing.symbol.as_str());
                continue;
            }
        }
        by_consumer.push((missing.consumer, vec![missing.symbol.as_str()]));
    }
    for (id, mut names) in by_consumer {
        names.sort_unstable();
        let file = tree.get(tree.require(id)?);
        sink.emit(
            Diagnostic::note(
                codes::UNRESOLVED_SYMBOLS,
                format!(
                    "{} references symbols no file defines: {}",
                    file.rel.display(),
                    names.join(", ")
                ),
            )
            .with_path(&file.rel),
        );
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
