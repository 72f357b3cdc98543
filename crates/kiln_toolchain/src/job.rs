//! Tool invocations and their results.

use std::path::PathBuf;

/// Compiling one translation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileJob {
    /// Compiler executable.
    pub compiler: String,
    /// Composed compiler flags.
    pub flags: Vec<String>,
    /// Source file.
    pub source: PathBuf,
    /// Object file to produce.
    pub object: PathBuf,
}

/// Linking objects into an executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkJob {
    /// Linker executable.
    pub linker: String,
    /// Base linker flags followed by the per-object flags.
    pub flags: Vec<String>,
    /// Objects in link order.
    pub objects: Vec<PathBuf>,
    /// Executable to produce.
    pub output: PathBuf,
}

/// Exit status and captured output of a tool that ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// A successful run with no output.
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// A failed run with the given exit code and message.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns `true` if the tool exited with status 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable exit status.
    pub fn status(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Global symbols of one object file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectSymbols {
    /// Symbols the object defines.
    pub defined: Vec<String>,
    /// Symbols the object references but does not define.
    pub undefined: Vec<String>,
}
