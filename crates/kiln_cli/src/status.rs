//! `kiln status`: show what a build would do.

use kiln_engine::Engine;

use crate::project::{load_plan, render_diagnostics, sink};
use crate::{GlobalArgs, TargetArgs};

/// Runs the `kiln status` command.
///
/// Prints one line per out-of-date file. Returns 0 when the target is up to
/// date and 1 when a build has work to do.
pub fn run(args: &TargetArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let plan = load_plan(global, args.target.as_deref())?;
    let sink = sink(global);
    let engine = Engine::with_processes(plan);
    let status = engine.status(&sink);
    render_diagnostics(&sink, global.color);
    let status = status?;

    if status.is_up_to_date() {
        if !global.quiet {
            eprintln!("  Up to date {}", engine.plan().target.name);
        }
        return Ok(0);
    }
    if !global.quiet {
        eprintln!(
            "     Pending {} to compile{}",
            status.to_compile.len(),
            if status.relink { ", relink" } else { "" }
        );
    }
    Ok(1)
}
