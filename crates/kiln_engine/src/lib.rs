//! The incremental build engine.
//!
//! A build runs seven stages in order:
//!
//! 1. index the target and hash every file's configuration;
//! 2. apply the previous run's cache to files whose hash still matches;
//! 3. scan includes of everything the cache did not cover and build the
//!    include graph;
//! 4. mark new and modified files changed and propagate along the include
//!    graph to everything that includes them;
//! 5. compile changed translation units and read their symbols;
//! 6. build the symbol graph and link everything reachable from the entry;
//! 7. write the cache back.
//!
//! Compile failures are collected and stop the link. The three outcomes
//! (work done, nothing to do, failed) stay distinct in [`BuildOutcome`].

#![warn(missing_docs)]

mod analysis;
mod compile;
pub mod engine;
pub mod error;
mod link;
pub mod outcome;
pub mod plan;
mod runner;

pub use engine::Engine;
pub use error::EngineError;
pub use outcome::{BuildOutcome, BuildReport, StatusReport, TestReport};
pub use plan::BuildPlan;
