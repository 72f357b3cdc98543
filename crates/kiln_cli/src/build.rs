//! `kiln build`: compile what changed and relink.

use kiln_engine::{BuildOutcome, Engine};

use crate::project::{load_plan, render_diagnostics, sink};
use crate::{GlobalArgs, TargetArgs};

/// Runs the `kiln build` command.
///
/// Returns 0 when something was built, -1 when the target was already up to
/// date, and the number of failed compiles (or 1 for a failed link) otherwise.
pub fn run(args: &TargetArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let plan = load_plan(global, args.target.as_deref())?;
    if !global.quiet {
        eprintln!("    Building {}", plan.target.name);
    }

    let sink = sink(global);
    let mut engine = Engine::with_processes(plan);
    let outcome = engine.build(&sink);
    render_diagnostics(&sink, global.color);
    let outcome = outcome?;

    if !global.quiet {
        let report = outcome.report();
        match &outcome {
            BuildOutcome::Built(_) => eprintln!(
                "    Finished {} ({} compiled)",
                report.output.display(),
                report.compiled.len()
            ),
            BuildOutcome::UpToDate(_) => {}
            BuildOutcome::Failed(_) if report.link_failed => eprintln!("      Failed to link"),
            BuildOutcome::Failed(_) => eprintln!(
                "      Failed {} of {} translation units",
                report.failed.len(),
                report.failed.len() + report.compiled.len()
            ),
        }
    }
    Ok(outcome.exit_code())
}
