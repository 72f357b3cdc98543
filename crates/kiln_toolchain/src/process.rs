//! Running tools as child processes.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::ToolError;
use crate::job::{CompileJob, LinkJob, ObjectSymbols, ToolOutput};
use crate::symbols::parse_posix_symbols;
use crate::Toolchain;

/// Runs the configured compiler, linker and symbol reader, blocking until each exits.
#[derive(Clone, Debug)]
pub struct ProcessToolchain {
    symbols: String,
}

impl ProcessToolchain {
    /// A toolchain reading symbols with `symbols` (an `nm`-compatible tool).
    pub fn new(symbols: impl Into<String>) -> Self {
        Self {
            symbols: symbols.into(),
        }
    }
}

/// `<compiler> <flags...> -c <source> -o <object>`
pub fn compile_command(job: &CompileJob) -> Command {
    let mut cmd = Command::new(&job.compiler);
    cmd.args(&job.flags)
        .arg("-c")
        .arg(&job.source)
        .arg("-o")
        .arg(&job.object);
    cmd
}

/// `<linker> <objects...> <flags...> -o <output>`
pub fn link_command(job: &LinkJob) -> Command {
    let mut cmd = Command::new(&job.linker);
    cmd.args(&job.objects).args(&job.flags).arg("-o").arg(&job.output);
    cmd
}

fn run(tool: &str, mut cmd: Command) -> Result<ToolOutput, ToolError> {
    tracing::debug!(command = ?cmd, "running");
    let output = cmd.output().map_err(|e| ToolError::spawn(tool, e))?;
    Ok(captured(output))
}

fn captured(output: Output) -> ToolOutput {
    ToolOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

impl Toolchain for ProcessToolchain {
    fn compile(&mut self, job: &CompileJob) -> Result<ToolOutput, ToolError> {
        run(&job.compiler, compile_command(job))
    }

    fn link(&mut self, job: &LinkJob) -> Result<ToolOutput, ToolError> {
        run(&job.linker, link_command(job))
    }

    fn read_symbols(&mut self, object: &Path) -> Result<ObjectSymbols, ToolError> {
        let mut cmd = Command::new(&self.symbols);
        cmd.arg("-P").arg(object);
        let output = run(&self.symbols, cmd)?;
        if !output.is_success() {
            return Err(ToolError::Symbols {
                object: object.to_path_buf(),
                message: format!(
                    "{} failed with {}: {}",
                    self.symbols,
                    output.status(),
                    output.stderr.trim()
                ),
            });
        }
        Ok(parse_posix_symbols(&output.stdout))
    }

    fn run_test(&mut self, executable: &Path, cwd: &Path) -> Result<ToolOutput, ToolError> {
        let mut cmd = Command::new(executable);
        cmd.current_dir(cwd);
        run(&executable.display().to_string(), cmd)
    }
}
