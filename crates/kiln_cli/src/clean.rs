//! `kiln clean`: remove a target's outputs and cache.

use kiln_engine::Engine;

use crate::project::load_plan;
use crate::{GlobalArgs, TargetArgs};

/// Runs the `kiln clean` command. Returns 0.
pub fn run(args: &TargetArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let plan = load_plan(global, args.target.as_deref())?;
    let engine = Engine::with_processes(plan);
    let removed = engine.clean()?;
    if !global.quiet {
        let name = &engine.plan().target.name;
        if removed {
            eprintln!("     Removed {}", engine.plan().target_dir.display());
        } else {
            eprintln!("     Nothing to clean for {name}");
        }
    }
    Ok(0)
}
