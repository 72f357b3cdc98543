//! `kiln test`: build, then link and run every test file.

use kiln_engine::Engine;

use crate::project::{load_plan, render_diagnostics, sink};
use crate::{GlobalArgs, TestArgs};

/// Runs the `kiln test` command.
///
/// Prints a summary line. Returns 0 if every selected test passed, the
/// build's exit code if the build failed, and 1 otherwise.
pub fn run(args: &TestArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let plan = load_plan(global, args.target.as_deref())?;
    if !global.quiet {
        eprintln!("     Testing {}", plan.target.name);
    }

    let sink = sink(global);
    let mut engine = Engine::with_processes(plan);
    let report = engine.test(args.filter.as_deref(), &sink);
    render_diagnostics(&sink, global.color);
    let report = report?;

    if !global.quiet && report.build.is_success() {
        for name in &report.failed {
            eprintln!("      FAILED {name}");
        }
        eprintln!(
            "\ntest result: {}. {} passed; {} failed",
            if report.failed.is_empty() { "ok" } else { "FAILED" },
            report.passed.len(),
            report.failed.len()
        );
    }
    Ok(report.exit_code())
}
