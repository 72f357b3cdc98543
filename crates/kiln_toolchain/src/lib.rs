//! The external tools a build drives: compiler, linker and symbol reader.
//!
//! The engine only sees the [`Toolchain`] trait, which also runs linked test
//! executables. [`ProcessToolchain`] runs
//! real executables as blocking child processes; tests substitute an
//! in-process implementation.

#![warn(missing_docs)]

pub mod error;
pub mod job;
pub mod process;
pub mod symbols;

pub use error::ToolError;
pub use job::{CompileJob, LinkJob, ObjectSymbols, ToolOutput};
pub use process::{compile_command, link_command, ProcessToolchain};
pub use symbols::parse_posix_symbols;

use std::path::Path;

/// Compile, link and symbol-extraction capabilities.
///
/// A tool that runs and exits non-zero is not an error: it is a
/// [`ToolOutput`] with a failing status. `Err` means the tool could not be
/// run or its output could not be understood.
pub trait Toolchain {
    /// Compiles one translation unit to an object file.
    fn compile(&mut self, job: &CompileJob) -> Result<ToolOutput, ToolError>;

    /// Links objects into an executable.
    fn link(&mut self, job: &LinkJob) -> Result<ToolOutput, ToolError>;

    /// Reads the defined and undefined global symbols of an object file.
    fn read_symbols(&mut self, object: &Path) -> Result<ObjectSymbols, ToolError>;

    /// Runs a linked test executable from `cwd`.
    fn run_test(&mut self, executable: &Path, cwd: &Path) -> Result<ToolOutput, ToolError>;
}
