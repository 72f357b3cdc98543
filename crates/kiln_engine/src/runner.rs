//! Linking and running test executables after a successful build.

use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_graph::Graph;
use kiln_index::{FileTree, Role};
use kiln_toolchain::Toolchain;

use crate::compile::tool_failure;
use crate::error::EngineError;
use crate::link::{link_job, run_link};
use crate::plan::BuildPlan;

/// Names of tests that passed and tests that failed.
#[derive(Debug, Default)]
pub(crate) struct TestResults {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

/// Links every test file whose name contains `filter` against the objects it
/// needs and runs it from the project root.
pub(crate) fn run_tests<T: Toolchain>(
    plan: &BuildPlan,
    tree: &FileTree,
    symbols: &Graph,
    filter: Option<&str>,
    toolchain: &mut T,
    sink: &DiagnosticSink,
) -> Result<TestResults, EngineError> {
    let mut results = TestResults::default();
    let tests = tree
        .iter()
        .filter(|(_, file)| matches!(file.role, Role::Test { .. }))
        .filter(|(_, file)| filter.map_or(true, |f| file.name.contains(f)));

    for (_, file) in tests {
        let job = link_job(plan, tree, symbols, file.id, plan.test_output(&file.name))?;
        if !run_link(&job, toolchain, sink)? {
            results.failed.push(file.name.clone());
            continue;
        }

        sink.emit(Diagnostic::note(
            codes::RUNNING_TEST,
            format!("running {}", file.name),
        ));
        match toolchain.run_test(&job.output, &plan.project_root) {
            Ok(output) if output.is_success() => results.passed.push(file.name.clone()),
            Ok(output) => {
                sink.emit(tool_failure(
                    Diagnostic::error(
                        codes::TEST_FAILED,
                        format!("test {} failed ({})", file.name, output.status()),
                    )
                    .with_path(&file.rel),
                    &output,
                ));
                results.failed.push(file.name.clone());
            }
            Err(err) => {
                sink.emit(
                    Diagnostic::error(codes::TEST_FAILED, format!("cannot run test {}", file.name))
                        .with_path(&file.rel)
                        .with_note(err.to_string()),
                );
                results.failed.push(file.name.clone());
            }
        }
    }
    tracing::debug!(
        passed = results.passed.len(),
        failed = results.failed.len(),
        "ran tests"
    );
    Ok(results)
}
