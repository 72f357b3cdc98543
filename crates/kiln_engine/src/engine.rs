//! The engine entry points: build, status, test and clean.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use kiln_cache::{CacheDocument, CacheStore};
use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_graph::{add_symbol_edges, Graph};
use kiln_index::{FileIdx, FileTree};
use kiln_toolchain::{ProcessToolchain, Toolchain};

use crate::analysis::{analyze, Analysis};
use crate::compile::compile_all;
use crate::error::EngineError;
use crate::link::{link_job, note_unresolved, run_link};
use crate::outcome::{BuildOutcome, BuildReport, StatusReport, TestReport};
use crate::plan::BuildPlan;
use crate::runner::run_tests;

/// Builds one target with a given toolchain.
///
/// Every entry point takes the run's [`DiagnosticSink`]; progress, warnings
/// and per-file failures go there, while `Err` is reserved for problems that
/// stop the run outright.
pub struct Engine<T: Toolchain> {
    plan: BuildPlan,
    toolchain: T,
}

/// A finished build together with what the test runner needs from it.
struct Build {
    outcome: BuildOutcome,
    tree: FileTree,
    symbols: Graph,
}

impl Engine<ProcessToolchain> {
    /// An engine running the target's real compiler, linker and symbol tool.
    pub fn with_processes(plan: BuildPlan) -> Self {
        let toolchain = ProcessToolchain::new(plan.target.symbols.clone());
        Self::new(plan, toolchain)
    }
}

impl<T: Toolchain> Engine<T> {
    /// Creates an engine for `plan`.
    pub fn new(plan: BuildPlan, toolchain: T) -> Self {
        Self { plan, toolchain }
    }

    /// The plan being built.
    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// The toolchain.
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// The toolchain, mutably.
    pub fn toolchain_mut(&mut self) -> &mut T {
        &mut self.toolchain
    }

    /// Brings the target's executable up to date.
    ///
    /// Compiles what changed since the last run, links if anything the
    /// executable depends on changed, and writes the cache back. A failure to
    /// write the cache is reported but does not change the outcome.
    pub fn build(&mut self, sink: &DiagnosticSink) -> Result<BuildOutcome, EngineError> {
        Ok(self.run_build(sink)?.outcome)
    }

    /// Reports what [`build`](Self::build) would do without compiling,
    /// linking or writing anything.
    pub fn status(&self, sink: &DiagnosticSink) -> Result<StatusReport, EngineError> {
        let analysis = analyze(&self.plan, sink)?;
        let rel = |idx: &FileIdx| analysis.tree.get(*idx).rel.clone();

        for (files, why) in [
            (&analysis.new, "is new"),
            (&analysis.modified, "was modified"),
            (&analysis.affected, "includes a changed file"),
        ] {
            for idx in files {
                let path = rel(idx);
                sink.emit(
                    Diagnostic::note(codes::OUT_OF_DATE, format!("{} {why}", path.display()))
                        .with_path(&path),
                );
            }
        }
        for name in &analysis.removed {
            sink.emit(Diagnostic::note(
                codes::OUT_OF_DATE,
                format!("{name} was removed"),
            ));
        }

        let to_compile: Vec<PathBuf> = analysis.to_compile().iter().map(rel).collect();
        let relink = !to_compile.is_empty() || self.needs_link(&analysis);
        Ok(StatusReport {
            new: analysis.new.iter().map(rel).collect(),
            modified: analysis.modified.iter().map(rel).collect(),
            affected: analysis.affected.iter().map(rel).collect(),
            removed: analysis.removed.clone(),
            to_compile,
            relink,
        })
    }

    /// Builds, then links and runs every test file whose name contains
    /// `filter`. Tests are not run if the build failed.
    pub fn test(
        &mut self,
        filter: Option<&str>,
        sink: &DiagnosticSink,
    ) -> Result<TestReport, EngineError> {
        let build = self.run_build(sink)?;
        if !build.outcome.is_success() {
            return Ok(TestReport {
                build: build.outcome,
                passed: Vec::new(),
                failed: Vec::new(),
            });
        }
        let results = run_tests(
            &self.plan,
            &build.tree,
            &build.symbols,
            filter,
            &mut self.toolchain,
            sink,
        )?;
        Ok(TestReport {
            build: build.outcome,
            passed: results.passed,
            failed: results.failed,
        })
    }

    /// Deletes the target's build directory and cache file.
    ///
    /// Returns `false` if there was nothing to delete.
    pub fn clean(&self) -> Result<bool, EngineError> {
        let dir_removed = match fs::remove_dir_all(&self.plan.target_dir) {
            Ok(()) => true,
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(EngineError::io(&self.plan.target_dir)(err)),
        };
        let cache_removed = CacheStore::new(&self.plan.cache_path).remove()?;
        tracing::debug!(dir_removed, cache_removed, target = %self.plan.target.name, "cleaned");
        Ok(dir_removed || cache_removed)
    }

    fn run_build(&mut self, sink: &DiagnosticSink) -> Result<Build, EngineError> {
        let mut analysis = analyze(&self.plan, sink)?;
        let units = analysis.to_compile();
        let summary = compile_all(
            &self.plan,
            &mut analysis.tree,
            &units,
            &mut self.toolchain,
            sink,
        )?;

        let mut report = BuildReport {
            compiled: summary.compiled,
            failed: summary.failed,
            removed: analysis.removed.clone(),
            linked: false,
            link_failed: false,
            output: self.plan.output.clone(),
        };
        let mut symbols = Graph::new();
        if !report.failed.is_empty() {
            self.save_cache(&analysis.tree, sink);
            return Ok(Build {
                outcome: BuildOutcome::Failed(report),
                tree: analysis.tree,
                symbols,
            });
        }

        let unresolved = add_symbol_edges(&analysis.tree, &mut symbols)?;
        sink.emit(Diagnostic::debug(
            codes::STAGE,
            format!(
                "symbol graph: {} edges, {} unresolved references",
                symbols.edge_count(),
                unresolved.len()
            ),
        ));

        let outcome = if !report.compiled.is_empty() || self.needs_link(&analysis) {
            let entry = analysis.tree.get(analysis.tree.entry()).id;
            let job = link_job(
                &self.plan,
                &analysis.tree,
                &symbols,
                entry,
                self.plan.output.clone(),
            )?;
            report.linked = true;
            if run_link(&job, &mut self.toolchain, sink)? {
                BuildOutcome::Built(report)
            } else {
                note_unresolved(&self.plan, &analysis.tree, &job, &unresolved, sink)?;
                report.link_failed = true;
                BuildOutcome::Failed(report)
            }
        } else {
            sink.emit(Diagnostic::note(
                codes::UP_TO_DATE,
                format!("{} is up to date", self.plan.target.name),
            ));
            BuildOutcome::UpToDate(report)
        };

        self.save_cache(&analysis.tree, sink);
        Ok(Build {
            outcome,
            tree: analysis.tree,
            symbols,
        })
    }

    /// Link triggers other than a fresh compile.
    fn needs_link(&self, analysis: &Analysis) -> bool {
        !analysis.removed.is_empty()
            || analysis.linker_changed(&self.plan.target.linker)
            || !self.plan.output.exists()
    }

    fn save_cache(&self, tree: &FileTree, sink: &DiagnosticSink) {
        let store = CacheStore::new(&self.plan.cache_path);
        let document = CacheDocument::from_tree(tree, &self.plan.target.linker);
        if let Err(err) = store.save(&document) {
            sink.emit(
                Diagnostic::error(codes::CACHE_WRITE_FAILED, "cannot write the build cache")
                    .with_path(store.path())
                    .with_note(err.to_string())
                    .with_note("the next build will start from scratch"),
            );
        }
    }
}
