//! Shared fixtures: a temporary project and an in-process toolchain.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kiln_diagnostics::{Diagnostic, DiagnosticSink, Verbosity};
use kiln_engine::{BuildOutcome, BuildPlan, Engine};
use kiln_toolchain::{CompileJob, LinkJob, ObjectSymbols, ToolError, ToolOutput, Toolchain};

/// One call into the toolchain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Compile(CompileJob),
    Link(LinkJob),
    RunTest(PathBuf),
}

/// Compiles by copying `// defines:`, `// uses:` and `// fails` comments of
/// the source into the object, links by concatenating objects, and records
/// every call.
///
/// A source containing `// error` fails to compile; a link with the flag
/// `--scripted-fail` fails; a test executable containing `fails` exits 1.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    pub log: Vec<Invocation>,
}

impl ScriptedToolchain {
    pub fn compiled(&self) -> Vec<PathBuf> {
        self.log
            .iter()
            .filter_map(|inv| match inv {
                Invocation::Compile(job) => Some(job.source.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn links(&self) -> Vec<&LinkJob> {
        self.log
            .iter()
            .filter_map(|inv| match inv {
                Invocation::Link(job) => Some(job),
                _ => None,
            })
            .collect()
    }
}

impl Toolchain for ScriptedToolchain {
    fn compile(&mut self, job: &CompileJob) -> Result<ToolOutput, ToolError> {
        self.log.push(Invocation::Compile(job.clone()));
        let source = fs::read_to_string(&job.source).map_err(|e| ToolError::Spawn {
            tool: job.compiler.clone(),
            message: e.to_string(),
        })?;
        if source.contains("// error") {
            return Ok(ToolOutput::failure(1, "error: scripted failure"));
        }
        let mut object = String::new();
        for line in source.lines() {
            let line = line.trim();
            if let Some(names) = line.strip_prefix("// defines:") {
                object.push_str(&format!("defines:{names}\n"));
            } else if let Some(names) = line.strip_prefix("// uses:") {
                object.push_str(&format!("uses:{names}\n"));
            } else if line == "// fails" {
                object.push_str("fails\n");
            }
        }
        fs::write(&job.object, object).map_err(|e| ToolError::Spawn {
            tool: job.compiler.clone(),
            message: e.to_string(),
        })?;
        Ok(ToolOutput::success())
    }

    fn link(&mut self, job: &LinkJob) -> Result<ToolOutput, ToolError> {
        self.log.push(Invocation::Link(job.clone()));
        if job.flags.iter().any(|f| f == "--scripted-fail") {
            return Ok(ToolOutput::failure(1, "ld: scripted failure"));
        }
        let mut exe = String::new();
        for object in &job.objects {
            exe.push_str(&fs::read_to_string(object).map_err(|e| ToolError::Spawn {
                tool: job.linker.clone(),
                message: format!("{}: {e}", object.display()),
            })?);
        }
        fs::write(&job.output, exe).map_err(|e| ToolError::Spawn {
            tool: job.linker.clone(),
            message: e.to_string(),
        })?;
        Ok(ToolOutput::success())
    }

    fn read_symbols(&mut self, object: &Path) -> Result<ObjectSymbols, ToolError> {
        let text = fs::read_to_string(object).map_err(|e| ToolError::Symbols {
            object: object.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut symbols = ObjectSymbols::default();
        for line in text.lines() {
            if let Some(names) = line.strip_prefix("defines:") {
                symbols.defined.extend(names.split_whitespace().map(String::from));
            } else if let Some(names) = line.strip_prefix("uses:") {
                symbols.undefined.extend(names.split_whitespace().map(String::from));
            }
        }
        Ok(symbols)
    }

    fn run_test(&mut self, executable: &Path, _cwd: &Path) -> Result<ToolOutput, ToolError> {
        self.log.push(Invocation::RunTest(executable.to_path_buf()));
        let exe = fs::read_to_string(executable).map_err(|e| ToolError::Spawn {
            tool: executable.display().to_string(),
            message: e.to_string(),
        })?;
        if exe.contains("fails") {
            Ok(ToolOutput::failure(1, "assertion failed"))
        } else {
            Ok(ToolOutput::success())
        }
    }
}

/// What one engine run produced.
pub struct Run {
    pub outcome: BuildOutcome,
    pub toolchain: ScriptedToolchain,
    pub diagnostics: Vec<Diagnostic>,
}

impl Run {
    /// Compiled sources relative to the project root.
    pub fn compiled(&self, project: &Project) -> Vec<PathBuf> {
        self.toolchain
            .compiled()
            .into_iter()
            .map(|p| p.strip_prefix(project.root()).map(Path::to_path_buf).unwrap_or(p))
            .collect()
    }
}

/// A throwaway project directory.
pub struct Project {
    dir: tempfile::TempDir,
    root: PathBuf,
}

pub const SIMPLE_TOML: &str = "[project]\nname = \"proj\"\nversion = \"0.1.0\"\n\n\
    [targets.app]\nentry = \"main.c\"\n";

impl Project {
    pub fn new(toml: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let project = Self { dir, root };
        project.write("kiln.toml", toml);
        project
    }

    /// The `a.h`, `a.c`, `main.c` project.
    pub fn hello() -> Self {
        let project = Self::new(SIMPLE_TOML);
        project.write("a.h", "int foo(void);\n");
        project.write("a.c", "#include \"a.h\"\n// defines: foo\nint foo(void) { return 1; }\n");
        project.write(
            "main.c",
            "#include \"a.h\"\n// defines: main\n// uses: foo\nint main(void) { return foo(); }\n",
        );
        project
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).unwrap();
    }

    /// Moves a file's modification time one second forward.
    pub fn touch(&self, rel: &str) {
        let path = self.path(rel);
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(mtime + Duration::from_secs(1)).unwrap();
    }

    pub fn plan(&self) -> BuildPlan {
        BuildPlan::load(&self.root, None).unwrap()
    }

    pub fn engine(&self) -> Engine<ScriptedToolchain> {
        Engine::new(self.plan(), ScriptedToolchain::default())
    }

    pub fn sink() -> DiagnosticSink {
        DiagnosticSink::with_verbosity(Verbosity::Verbose)
    }

    pub fn build(&self) -> Run {
        let mut engine = self.engine();
        let sink = Self::sink();
        let outcome = engine.build(&sink).unwrap();
        Run {
            outcome,
            toolchain: std::mem::take(engine.toolchain_mut()),
            diagnostics: sink.diagnostics(),
        }
    }

    pub fn cache_bytes(&self) -> Vec<u8> {
        fs::read(self.plan().cache_path).unwrap()
    }
}
